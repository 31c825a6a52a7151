//! Overseer: the decision core behind an unseen pursuer.
//!
//! The Overseer never knows where the player is. It listens to environmental
//! stimuli, keeps a per-zone suspicion field, leases the most promising zone
//! to the pursuer as a search job and rests the pursuer when tension runs too
//! high.
//!
//! # Architecture
//!
//! ```text
//!  stimuli ──▶ ┌──────────────┐  Top-K roulette  ┌──────────────┐
//!              │  suspicion   │ ───────────────▶ │  allocator   │
//!              └──────────────┘                  └──────┬───────┘
//!                     ▲  cleared zone                   │ lease
//!                     │                                 ▼
//!              ┌──────┴───────┐   chase / close   ┌──────────────┐
//!              │   pursuer    │ ────────────────▶ │   tension    │
//!              └──────┬───────┘ ◀──── rest ────── └──────────────┘
//!                     │ MoveTo / Stop / Warp
//!                     ▼
//!              navigation collaborator
//! ```
//!
//! # Modules
//!
//! - [`suspicion`]: per-zone heat with decay and neighbor spread
//! - [`allocator`]: leased search jobs drawn by weighted roulette
//! - [`tension`]: engagement scalar and the active/dormant duty cycle
//! - [`pursuer`]: the patrol/investigate/chase/search state machine
//! - [`stay`]: turns continuous presence into lingered stimuli
//! - [`vent`]: where a resting pursuer despawns
//! - [`config`]: TOML configuration

pub mod allocator;
pub mod config;
pub mod pursuer;
pub mod stay;
pub mod suspicion;
pub mod tension;
pub mod vent;

pub use allocator::{build_shortlist, spin, total_weight, Candidate, JobAllocator, SearchJob};
pub use config::{
    default_config_toml, AllocatorConfig, ConfigError, OverseerConfig, PursuerConfig, StayConfig,
    SuspicionConfig, TensionConfig,
};
pub use pursuer::{NoiseCue, Pursuer, PursuerReport, PursuerSenses};
pub use stay::StayTracker;
pub use suspicion::SuspicionField;
pub use tension::{TensionController, TENSION_MAX};
pub use vent::select_return_vent;

use std::path::Path;
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use lurk_events::{
    DutyPhase, MoveCommand, NoiseSource, OverseerSnapshot, PursuerState, SimTime, StimulusEvent,
    ZoneDef, ZoneGraph, ZoneGraphError, ZoneId,
};

/// Errors that can occur while building an Overseer.
#[derive(Debug, Error)]
pub enum OverseerError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("zone graph error: {0}")]
    Graph(#[from] ZoneGraphError),
}

/// Everything one orchestrator tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    pub time: SimTime,
    /// Movement commands for the navigation collaborator, in order
    pub commands: Vec<MoveCommand>,
    /// Job handed to the pursuer this tick
    pub job: Option<SearchJob>,
    pub phase_change: Option<DutyPhase>,
    pub transitions: Vec<(PursuerState, PursuerState)>,
    /// Zone scaled down after a fruitless search
    pub cleared_zone: Option<ZoneId>,
    /// Zone the stay tracker reported this tick
    pub lingered: Option<ZoneId>,
}

/// Owns the decision components and runs them in a fixed order each tick.
#[derive(Debug)]
pub struct Overseer {
    config: OverseerConfig,
    graph: Arc<ZoneGraph>,
    field: SuspicionField,
    allocator: JobAllocator,
    tension: TensionController,
    pursuer: Pursuer,
    stay: StayTracker,
    rng: SmallRng,
    time: SimTime,
    decay_accumulator: f32,
    player_zone: Option<ZoneId>,
    enabled: bool,
}

impl Overseer {
    /// Creates an Overseer over a validated zone graph.
    ///
    /// All randomness comes from a `SmallRng` seeded with `seed`, so the same
    /// seed and inputs replay identically.
    pub fn new(
        config: OverseerConfig,
        graph: Arc<ZoneGraph>,
        seed: u64,
    ) -> Result<Self, OverseerError> {
        config.validate()?;

        let field = SuspicionField::new(Arc::clone(&graph), &config.suspicion);
        let allocator = JobAllocator::new(config.allocator.clone());
        let tension = TensionController::new(config.tension.clone());
        let pursuer = Pursuer::new(config.pursuer.clone(), Arc::clone(&graph));
        let stay = StayTracker::new(&config.stay);

        info!(zones = graph.len(), seed, "overseer ready");

        Ok(Self {
            config,
            graph,
            field,
            allocator,
            tension,
            pursuer,
            stay,
            rng: SmallRng::seed_from_u64(seed),
            time: SimTime::start(),
            decay_accumulator: 0.0,
            player_zone: None,
            enabled: true,
        })
    }

    /// Validates raw zone definitions and builds an Overseer over them.
    pub fn from_zones(
        config: OverseerConfig,
        zones: Vec<ZoneDef>,
        seed: u64,
    ) -> Result<Self, OverseerError> {
        let graph = ZoneGraph::new(zones)?;
        Self::new(config, Arc::new(graph), seed)
    }

    /// Creates an Overseer from a configuration file.
    pub fn from_config_file(
        path: &Path,
        graph: Arc<ZoneGraph>,
        seed: u64,
    ) -> Result<Self, OverseerError> {
        let config = OverseerConfig::from_file(path)?;
        Self::new(config, graph, seed)
    }

    /// Feeds one stimulus into the core. Unknown zones are ignored.
    ///
    /// Zone changes are tracked even while disabled; every other stimulus is
    /// dropped until the core is switched back on.
    pub fn handle_event(&mut self, event: StimulusEvent) {
        if let StimulusEvent::PlayerZoneChanged { zone } = event {
            self.set_player_zone(zone);
            return;
        }
        if !self.enabled {
            return;
        }
        debug!(kind = event.kind(), "stimulus");

        let s = &self.config.suspicion;
        match event {
            StimulusEvent::PlayerLingered { zone } => {
                if !self.field.add_with_spread(zone, s.camp_increment, s.spread_ratio) {
                    warn!(%zone, "lingered report for unknown zone");
                }
            }
            StimulusEvent::NoiseHeard { source, strength } => {
                let (zone, position) = match source {
                    NoiseSource::Zone(zone) => match self.graph.center(zone) {
                        Some(center) => (zone, center),
                        None => {
                            warn!(%zone, "noise from unknown zone");
                            return;
                        }
                    },
                    NoiseSource::Position(position) => {
                        (self.graph.nearest_zone(&position), position)
                    }
                };
                let amount = s.noise_increment * strength.max(0.0);
                self.field.add_with_spread(zone, amount, s.spread_ratio);
                self.pursuer.hear_noise(NoiseCue {
                    zone,
                    position,
                    strength,
                });
            }
            StimulusEvent::CameraDetected { zone } => {
                if !self.field.add_direct(zone, s.camera_increment) {
                    warn!(%zone, "camera report for unknown zone");
                }
            }
            StimulusEvent::DirectSight { position } => {
                let zone = self.graph.nearest_zone(&position);
                self.field.add_direct(zone, s.sight_increment);
                self.pursuer.see_player(position);
            }
            StimulusEvent::PlayerZoneChanged { .. } => {}
        }
    }

    fn set_player_zone(&mut self, zone: Option<ZoneId>) {
        let zone = match zone {
            Some(z) if !self.graph.contains(z) => {
                warn!(zone = %z, "player reported in unknown zone");
                None
            }
            other => other,
        };
        self.player_zone = zone;
        self.stay.set_zone(zone);
    }

    /// Runs one tick: decay, stay tracking, tension, job allocation, then the
    /// pursuer, whose outcomes are fed back before returning.
    pub fn tick(&mut self, dt: f32, senses: &PursuerSenses) -> TickOutput {
        let dt = dt.max(0.0);
        self.time.advance(dt);

        let mut output = TickOutput {
            time: self.time,
            ..TickOutput::default()
        };

        if !self.enabled {
            let report = self.pursuer.tick(dt, senses, &mut self.rng);
            self.report_engagement(report.chase_changed, report.close_changed);
            output.commands = report.commands;
            output.transitions = report.transitions;
            return output;
        }

        // 1. Suspicion decay on its own fixed cadence
        let interval = self.config.suspicion.decay_interval_secs;
        self.decay_accumulator += dt;
        while self.decay_accumulator >= interval {
            self.field.tick(interval);
            self.decay_accumulator -= interval;
        }

        if let Some(zone) = self.stay.tick(dt) {
            let s = &self.config.suspicion;
            self.field
                .add_with_spread(zone, s.camp_increment, s.spread_ratio);
            output.lingered = Some(zone);
        }

        // 2. Tension and duty cycle
        let mut vanish_to = None;
        output.phase_change = self.tension.tick(dt);
        match output.phase_change {
            Some(DutyPhase::Dormant) => {
                self.pursuer.rest();
                self.allocator.clear_job();
                if self.config.pursuer.vanish_on_rest {
                    vanish_to = select_return_vent(&self.graph, &senses.position, self.player_zone);
                }
            }
            Some(DutyPhase::Active) => self.pursuer.resume(),
            None => {}
        }

        // 3. Job allocation, paced by tension
        if self.tension.phase() == DutyPhase::Active && self.tension.take_hint() {
            if let Some(job) = self
                .allocator
                .request_job(&self.field, self.time.seconds, &mut self.rng)
            {
                if self.pursuer.assign_job(&job) {
                    output.job = Some(job);
                }
            }
        }

        // 4. Pursuer
        let report = self.pursuer.tick(dt, senses, &mut self.rng);
        self.report_engagement(report.chase_changed, report.close_changed);
        if let Some(zone) = report.cleared_zone {
            self.field
                .multiply_zone(zone, self.config.suspicion.searched_multiplier);
            if self.allocator.held_job().map(|job| job.zone) == Some(zone) {
                self.allocator.clear_job();
            }
            output.cleared_zone = Some(zone);
        }

        output.commands = report.commands;
        output.transitions = report.transitions;
        if let Some((zone, vent)) = vanish_to {
            debug!(%zone, "pursuer vanishing into vent");
            output.commands.push(MoveCommand::warp(vent));
        }
        output
    }

    /// Pursuer flags are edge-triggered, so every flip must reach tension,
    /// enabled or not.
    fn report_engagement(&mut self, chase_changed: Option<bool>, close_changed: Option<bool>) {
        if let Some(chasing) = chase_changed {
            self.tension.report_chase_state_changed(chasing);
        }
        if let Some(close) = close_changed {
            self.tension.report_close_to_player_changed(close);
        }
    }

    /// Clears every zone's suspicion.
    pub fn reset_suspicion(&mut self) {
        info!("suspicion reset");
        self.field.reset_all();
    }

    /// Switches the whole core on or off. Off rests the pursuer and drops
    /// every stimulus until switched back on.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        info!(enabled, "overseer toggled");
        if enabled {
            if self.tension.phase() == DutyPhase::Active {
                self.pursuer.resume();
            }
        } else {
            self.pursuer.rest();
            self.allocator.clear_job();
        }
    }

    /// Toggles lingered reporting from the stay tracker.
    pub fn set_stay_reporting(&mut self, enabled: bool) {
        self.stay.set_enabled(enabled);
    }

    pub fn suspicion(&self, zone: ZoneId) -> f32 {
        self.field.value(zone)
    }

    pub fn hottest_zone(&self) -> ZoneId {
        self.field.hottest_zone()
    }

    pub fn pursuer_state(&self) -> PursuerState {
        self.pursuer.state()
    }

    pub fn urgency(&self) -> f32 {
        self.pursuer.urgency()
    }

    pub fn tension(&self) -> f32 {
        self.tension.tension()
    }

    pub fn phase(&self) -> DutyPhase {
        self.tension.phase()
    }

    /// The lease if it is still valid now.
    pub fn current_job(&self) -> Option<SearchJob> {
        self.allocator.current_job(self.time.seconds)
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn player_zone(&self) -> Option<ZoneId> {
        self.player_zone
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &OverseerConfig {
        &self.config
    }

    pub fn graph(&self) -> &ZoneGraph {
        &self.graph
    }

    pub fn field(&self) -> &SuspicionField {
        &self.field
    }

    pub fn pursuer(&self) -> &Pursuer {
        &self.pursuer
    }

    pub fn snapshot(&self) -> OverseerSnapshot {
        OverseerSnapshot {
            time: self.time,
            zones: self.field.heat_map(),
            tension: self.tension.tension(),
            phase: self.tension.phase(),
            pursuer_state: self.pursuer.state(),
            urgency: self.pursuer.urgency(),
            lease: self.current_job().map(|job| job.snapshot()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lurk_events::{fixtures, Position};

    fn overseer() -> Overseer {
        Overseer::new(
            OverseerConfig::default(),
            Arc::new(fixtures::six_zone_line()),
            7,
        )
        .unwrap()
    }

    #[test]
    fn test_overseer_creation() {
        let overseer = overseer();
        assert_eq!(overseer.phase(), DutyPhase::Active);
        assert_eq!(overseer.pursuer_state(), PursuerState::Patrol);
        assert_eq!(overseer.tension(), 0.0);
        assert!(overseer.current_job().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = OverseerConfig::default();
        config.tension.low_threshold = 90.0;
        let result = Overseer::new(config, Arc::new(fixtures::six_zone_line()), 1);
        assert!(matches!(result, Err(OverseerError::Config(_))));
    }

    #[test]
    fn test_invalid_graph_rejected() {
        let zones = vec![ZoneDef::new(0, "a", Position::default()).with_neighbors(&[0])];
        let result = Overseer::from_zones(OverseerConfig::default(), zones, 1);
        assert!(matches!(result, Err(OverseerError::Graph(_))));
    }

    #[test]
    fn test_stimuli_feed_the_field() {
        let mut overseer = overseer();

        overseer.handle_event(StimulusEvent::PlayerLingered { zone: ZoneId(2) });
        assert_eq!(overseer.suspicion(ZoneId(2)), 10.0);
        assert_eq!(overseer.suspicion(ZoneId(1)), 2.0);

        overseer.handle_event(StimulusEvent::CameraDetected { zone: ZoneId(5) });
        assert_eq!(overseer.suspicion(ZoneId(5)), 40.0);
        assert_eq!(overseer.suspicion(ZoneId(4)), 0.0);

        overseer.handle_event(StimulusEvent::NoiseHeard {
            source: NoiseSource::Zone(ZoneId(0)),
            strength: 0.5,
        });
        assert_eq!(overseer.suspicion(ZoneId(0)), 10.0);
        assert_eq!(overseer.suspicion(ZoneId(1)), 4.0);

        overseer.handle_event(StimulusEvent::DirectSight {
            position: Position::new(61.0, 0.0, 0.0),
        });
        assert_eq!(overseer.suspicion(ZoneId(3)), 2.0 + 10.0);

        assert_eq!(overseer.hottest_zone(), ZoneId(5));
    }

    #[test]
    fn test_unknown_zones_ignored() {
        let mut overseer = overseer();
        overseer.handle_event(StimulusEvent::PlayerLingered { zone: ZoneId(40) });
        overseer.handle_event(StimulusEvent::CameraDetected { zone: ZoneId(40) });
        overseer.handle_event(StimulusEvent::NoiseHeard {
            source: NoiseSource::Zone(ZoneId(40)),
            strength: 1.0,
        });
        overseer.handle_event(StimulusEvent::PlayerZoneChanged {
            zone: Some(ZoneId(40)),
        });

        assert!(overseer.field().values().iter().all(|&v| v == 0.0));
        assert_eq!(overseer.player_zone(), None);
    }

    #[test]
    fn test_decay_runs_on_fixed_cadence() {
        let mut overseer = overseer();
        overseer.handle_event(StimulusEvent::CameraDetected { zone: ZoneId(0) });

        let senses = PursuerSenses::default();
        overseer.tick(0.25, &senses);
        overseer.tick(0.25, &senses);
        overseer.tick(0.25, &senses);
        assert_eq!(overseer.suspicion(ZoneId(0)), 40.0);

        overseer.tick(0.25, &senses);
        assert_eq!(overseer.suspicion(ZoneId(0)), 37.5);
    }

    #[test]
    fn test_first_tick_hands_out_job() {
        let mut overseer = overseer();
        overseer.handle_event(StimulusEvent::CameraDetected { zone: ZoneId(4) });

        let output = overseer.tick(0.1, &PursuerSenses::default());
        let job = output.job.unwrap();
        assert_eq!(job.zone, ZoneId(4));
        assert_eq!(overseer.pursuer_state(), PursuerState::Investigate);
        assert!(output
            .commands
            .contains(&MoveCommand::move_to(Position::new(80.0, 0.0, 0.0))));
        assert_eq!(overseer.current_job(), Some(job));
    }

    #[test]
    fn test_stay_tracker_emits_lingered() {
        let mut overseer = overseer();
        overseer.set_stay_reporting(true);
        overseer.handle_event(StimulusEvent::PlayerZoneChanged {
            zone: Some(ZoneId(1)),
        });

        let senses = PursuerSenses::default();
        let mut lingered = Vec::new();
        for _ in 0..35 {
            if let Some(zone) = overseer.tick(0.1, &senses).lingered {
                lingered.push(zone);
            }
        }
        assert_eq!(lingered, vec![ZoneId(1)]);
        assert_eq!(overseer.player_zone(), Some(ZoneId(1)));
    }

    #[test]
    fn test_disabled_overseer_ignores_stimuli() {
        let mut overseer = overseer();
        overseer.tick(0.1, &PursuerSenses::default());
        overseer.set_enabled(false);
        assert_eq!(overseer.pursuer_state(), PursuerState::Stopped);

        overseer.handle_event(StimulusEvent::CameraDetected { zone: ZoneId(2) });
        assert_eq!(overseer.suspicion(ZoneId(2)), 0.0);

        let output = overseer.tick(0.1, &PursuerSenses::default());
        assert_eq!(output.commands, vec![MoveCommand::Stop]);

        overseer.set_enabled(true);
        assert_eq!(overseer.pursuer_state(), PursuerState::Patrol);
    }

    #[test]
    fn test_disabling_mid_chase_releases_tension() {
        let mut overseer = overseer();
        let calm = PursuerSenses::default();

        overseer.handle_event(StimulusEvent::DirectSight {
            position: Position::new(5.0, 0.0, 0.0),
        });
        overseer.tick(0.1, &calm);
        assert_eq!(overseer.pursuer_state(), PursuerState::Chase);

        overseer.set_enabled(false);
        overseer.tick(0.1, &calm);
        overseer.set_enabled(true);

        let mut previous = overseer.tension();
        let mut woke_up = false;
        for _ in 0..3000 {
            let output = overseer.tick(0.1, &calm);
            assert!(overseer.tension() <= previous);
            previous = overseer.tension();
            if output.phase_change == Some(DutyPhase::Active) {
                woke_up = true;
            }
        }
        assert_eq!(overseer.tension(), 0.0);
        assert!(woke_up, "duty cycle never returned to active");
    }

    #[test]
    fn test_zone_changes_tracked_while_disabled() {
        let mut overseer = overseer();
        overseer.handle_event(StimulusEvent::PlayerZoneChanged {
            zone: Some(ZoneId(1)),
        });
        overseer.set_enabled(false);
        overseer.handle_event(StimulusEvent::PlayerZoneChanged {
            zone: Some(ZoneId(4)),
        });
        overseer.set_enabled(true);
        assert_eq!(overseer.player_zone(), Some(ZoneId(4)));

        let senses = PursuerSenses::default();
        let mut lingered = Vec::new();
        for _ in 0..35 {
            if let Some(zone) = overseer.tick(0.1, &senses).lingered {
                lingered.push(zone);
            }
        }
        assert_eq!(lingered, vec![ZoneId(4)]);
    }

    #[test]
    fn test_reset_suspicion() {
        let mut overseer = overseer();
        overseer.handle_event(StimulusEvent::CameraDetected { zone: ZoneId(2) });
        overseer.reset_suspicion();
        assert_eq!(overseer.suspicion(ZoneId(2)), 0.0);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut overseer = overseer();
        overseer.handle_event(StimulusEvent::CameraDetected { zone: ZoneId(3) });
        overseer.tick(0.5, &PursuerSenses::default());

        let snapshot = overseer.snapshot();
        assert_eq!(snapshot.zones.len(), 6);
        assert_eq!(snapshot.suspicion(ZoneId(3)), 40.0);
        assert_eq!(snapshot.pursuer_state, PursuerState::Investigate);
        assert_eq!(snapshot.lease.map(|l| l.zone), Some(ZoneId(3)));
        assert_eq!(snapshot.time.tick, 1);
    }
}
