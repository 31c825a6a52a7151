//! Pursuer State Machine
//!
//! Drives the pursuer through patrol, investigate, chase and search. Movement
//! itself belongs to the navigation collaborator: this module only issues
//! [`MoveCommand`]s and reads back [`PursuerSenses`] on the next tick.
//!
//! ```text
//!            job / noise              arrived
//! Patrol ──────────────▶ Investigate ─────────▶ Search ──timeout──▶ Patrol
//!   │                        │                  ▲   │
//!   │ sight                  │ sight     lost │   │ sight
//!   ▼                        ▼                │   ▼
//!   └──────────────────────▶ Chase ───────────┘ Chase
//! ```
//!
//! Any state drops to `Stopped` on a rest command and comes back at `Patrol`.

use std::f32::consts::TAU;
use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use lurk_events::{MoveCommand, Position, PursuerState, ZoneGraph, ZoneId};

use crate::allocator::SearchJob;
use crate::config::PursuerConfig;
use crate::tension::lerp;

/// What the navigation collaborator reports each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PursuerSenses {
    pub position: Position,
    /// Distance left on the current path; `None` while a path is pending
    pub remaining_distance: Option<f32>,
    /// Externally measured distance to the player, if known
    pub player_distance: Option<f32>,
}

impl PursuerSenses {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// A noise the pursuer may or may not hear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseCue {
    pub zone: ZoneId,
    pub position: Position,
    pub strength: f32,
}

/// Everything one pursuer tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PursuerReport {
    pub commands: Vec<MoveCommand>,
    /// `(from, to)` for every transition taken this tick
    pub transitions: Vec<(PursuerState, PursuerState)>,
    /// Set when the chase flag flipped
    pub chase_changed: Option<bool>,
    /// Set when the close-to-player flag flipped
    pub close_changed: Option<bool>,
    /// Zone whose search ended without finding anyone
    pub cleared_zone: Option<ZoneId>,
}

#[derive(Debug, Clone)]
pub struct Pursuer {
    config: PursuerConfig,
    graph: Arc<ZoneGraph>,
    route: Vec<Position>,
    route_index: usize,
    state: PursuerState,
    target: Option<Position>,
    /// Where the player was last seen, or where the current lead points
    last_known: Position,
    /// Zone the current lead is about
    lead_zone: Option<ZoneId>,
    urgency: f32,
    search_elapsed: f32,
    search_duration: f32,
    /// Time spent waiting at the current patrol point
    dwell: Option<f32>,
    sight: Option<Position>,
    noise: Option<NoiseCue>,
    reported_chasing: bool,
    reported_close: bool,
    pending: Vec<MoveCommand>,
    pending_transitions: Vec<(PursuerState, PursuerState)>,
}

impl Pursuer {
    /// Starts patrolling the graph's patrol route, or idles without one.
    pub fn new(config: PursuerConfig, graph: Arc<ZoneGraph>) -> Self {
        let route = graph.patrol_route();
        let mut pursuer = Self {
            config,
            graph,
            route,
            route_index: 0,
            state: PursuerState::Idle,
            target: None,
            last_known: Position::default(),
            lead_zone: None,
            urgency: 0.0,
            search_elapsed: 0.0,
            search_duration: 0.0,
            dwell: None,
            sight: None,
            noise: None,
            reported_chasing: false,
            reported_close: false,
            pending: Vec::new(),
            pending_transitions: Vec::new(),
        };
        if let Some(&first) = pursuer.route.first() {
            pursuer.state = PursuerState::Patrol;
            pursuer.move_to(first);
        }
        pursuer
    }

    /// Latches a direct sighting for the next tick.
    pub fn see_player(&mut self, position: Position) {
        self.sight = Some(position);
    }

    /// Latches a noise for the next tick. A louder noise replaces a quieter
    /// one heard in the same tick.
    pub fn hear_noise(&mut self, cue: NoiseCue) {
        match self.noise {
            Some(existing) if existing.strength >= cue.strength => {}
            _ => self.noise = Some(cue),
        }
    }

    /// Hands over a search job. Only an idle or patrolling pursuer takes it.
    pub fn assign_job(&mut self, job: &SearchJob) -> bool {
        if !self.state.is_available() {
            return false;
        }
        let Some(center) = self.graph.center(job.zone) else {
            return false;
        };
        debug!(lease_id = job.lease_id, zone = %job.zone, "pursuer took job");
        self.enter_investigate(center, job.zone);
        true
    }

    /// Halts the pursuer and clears its search state.
    pub fn rest(&mut self) {
        if self.state == PursuerState::Stopped {
            return;
        }
        self.transition(PursuerState::Stopped);
        self.urgency = 0.0;
        self.search_elapsed = 0.0;
        self.search_duration = 0.0;
        self.target = None;
        self.lead_zone = None;
        self.dwell = None;
        self.sight = None;
        self.noise = None;
        self.pending.push(MoveCommand::Stop);
    }

    /// Leaves rest and goes back to the patrol route.
    pub fn resume(&mut self) {
        if self.state == PursuerState::Stopped {
            self.enter_patrol_or_idle();
        }
    }

    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        senses: &PursuerSenses,
        rng: &mut R,
    ) -> PursuerReport {
        let dt = dt.max(0.0);
        let mut cleared_zone = None;

        if self.urgency > 0.0 {
            self.urgency = (self.urgency - self.config.urgency_decay_per_sec * dt).max(0.0);
        }

        let sight = self.sight.take();
        let noise = self.noise.take().filter(|cue| self.can_hear(cue, senses));
        let arrived = senses
            .remaining_distance
            .map(|d| d < self.config.arrive_distance)
            .unwrap_or(false);
        let at_waypoint = senses
            .remaining_distance
            .map(|d| d <= self.config.waypoint_arrive_distance)
            .unwrap_or(false);

        match (self.state, sight) {
            (PursuerState::Stopped, _) => {}
            (PursuerState::Chase, Some(position)) => {
                self.last_known = position;
                self.move_to(position);
            }
            (_, Some(position)) => {
                self.last_known = position;
                self.transition(PursuerState::Chase);
                self.move_to(position);
            }
            (PursuerState::Idle, None) => {
                if let Some(cue) = noise {
                    self.enter_investigate(cue.position, cue.zone);
                }
            }
            (PursuerState::Patrol, None) => {
                if let Some(cue) = noise {
                    self.enter_investigate(cue.position, cue.zone);
                } else if at_waypoint {
                    self.advance_patrol(dt);
                }
            }
            (PursuerState::Investigate, None) => {
                if let Some(cue) = noise {
                    self.enter_investigate(cue.position, cue.zone);
                } else if arrived {
                    if let Some(target) = self.target {
                        self.last_known = target;
                    }
                    self.enter_search(rng);
                }
            }
            (PursuerState::Chase, None) => {
                if arrived {
                    self.urgency =
                        (self.urgency + self.config.urgency_on_lose_sight).clamp(0.0, 1.0);
                    self.lead_zone = Some(self.graph.nearest_zone(&self.last_known));
                    debug!(urgency = self.urgency, "lost sight of player");
                    self.enter_search(rng);
                }
            }
            (PursuerState::Search, None) => {
                if let Some(cue) = noise {
                    self.enter_investigate(cue.position, cue.zone);
                } else {
                    self.search_elapsed += dt;
                    if self.search_elapsed >= self.search_duration {
                        cleared_zone = self
                            .lead_zone
                            .take()
                            .or_else(|| Some(self.graph.nearest_zone(&self.last_known)));
                        debug!(zone = ?cleared_zone, "search came up empty");
                        self.enter_patrol_or_idle();
                    } else if at_waypoint {
                        self.sweep(rng);
                    }
                }
            }
        }

        let chasing = self.state == PursuerState::Chase;
        let chase_changed = (chasing != self.reported_chasing).then(|| {
            self.reported_chasing = chasing;
            chasing
        });

        let close = senses
            .player_distance
            .map(|d| d < self.config.close_distance)
            .unwrap_or(false);
        let close_changed = (close != self.reported_close).then(|| {
            self.reported_close = close;
            close
        });

        PursuerReport {
            commands: std::mem::take(&mut self.pending),
            transitions: std::mem::take(&mut self.pending_transitions),
            chase_changed,
            close_changed,
            cleared_zone,
        }
    }

    fn can_hear(&self, cue: &NoiseCue, senses: &PursuerSenses) -> bool {
        let range = self.config.hearing_range * cue.strength.max(0.0);
        cue.position.distance(&senses.position) <= range
    }

    fn transition(&mut self, to: PursuerState) {
        let from = self.state;
        if from != to {
            debug!(%from, %to, "pursuer state change");
            self.pending_transitions.push((from, to));
        }
        self.state = to;
        self.dwell = None;
    }

    fn move_to(&mut self, target: Position) {
        if self.target != Some(target) {
            self.target = Some(target);
            self.pending.push(MoveCommand::move_to(target));
        }
    }

    fn enter_patrol(&mut self) {
        self.transition(PursuerState::Patrol);
        self.lead_zone = None;
        if let Some(&point) = self.route.get(self.route_index) {
            self.target = None;
            self.move_to(point);
        }
    }

    fn enter_patrol_or_idle(&mut self) {
        if self.route.is_empty() {
            self.transition(PursuerState::Idle);
            self.lead_zone = None;
            self.target = None;
            self.pending.push(MoveCommand::Stop);
        } else {
            self.enter_patrol();
        }
    }

    fn advance_patrol(&mut self, dt: f32) {
        let waited = self.dwell.map(|w| w + dt).unwrap_or(0.0);
        if waited < self.config.patrol_dwell_secs {
            self.dwell = Some(waited);
            return;
        }
        self.dwell = None;
        self.route_index = (self.route_index + 1) % self.route.len();
        let point = self.route[self.route_index];
        self.target = None;
        self.move_to(point);
    }

    fn enter_investigate(&mut self, target: Position, zone: ZoneId) {
        self.transition(PursuerState::Investigate);
        self.lead_zone = Some(zone);
        self.target = None;
        self.move_to(target);
    }

    fn enter_search<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.transition(PursuerState::Search);
        self.search_elapsed = 0.0;
        self.search_duration = lerp(
            self.config.search_duration_min_secs,
            self.config.search_duration_max_secs,
            self.urgency,
        );
        self.sweep(rng);
    }

    /// Heads for a random point around the last known position.
    fn sweep<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let radius = lerp(
            self.config.search_radius_min,
            self.config.search_radius_max,
            self.urgency,
        );
        let angle = rng.gen::<f32>() * TAU;
        let distance = rng.gen::<f32>() * radius;
        let point = self
            .last_known
            .offset_planar(angle.cos() * distance, angle.sin() * distance);
        self.target = None;
        self.move_to(point);
    }

    pub fn state(&self) -> PursuerState {
        self.state
    }

    pub fn urgency(&self) -> f32 {
        self.urgency
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }

    pub fn last_known(&self) -> Position {
        self.last_known
    }

    /// Zone the pursuer is currently investigating or searching.
    pub fn lead_zone(&self) -> Option<ZoneId> {
        self.lead_zone
    }

    pub fn search_duration(&self) -> f32 {
        self.search_duration
    }

    pub fn search_elapsed(&self) -> f32 {
        self.search_elapsed
    }
}
