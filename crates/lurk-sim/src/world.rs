//! Stand-ins for the game's world collaborators.
//!
//! [`Body`] plays the navigation system: it walks straight at its target and
//! obeys `Stop` and `Warp`. [`World`] adds containment, a line-of-sight
//! model (same zone and within range) and cameras that fire when the player
//! walks into a watched zone.

use std::sync::Arc;

use lurk_events::{MoveCommand, Position, StimulusEvent, ZoneGraph, ZoneId};
use overseer::PursuerSenses;

use crate::scenario::Visit;

/// Remaining distance under which the player counts as settled in place.
const SETTLED: f32 = 0.1;

/// Kinematic body moving in straight lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Position,
    pub speed: f32,
    target: Option<Position>,
}

impl Body {
    pub fn new(position: Position, speed: f32) -> Self {
        Self {
            position,
            speed,
            target: None,
        }
    }

    pub fn apply(&mut self, command: &MoveCommand) {
        match command {
            MoveCommand::MoveTo { target } => self.target = Some(*target),
            MoveCommand::Stop => self.target = None,
            MoveCommand::Warp { target } => {
                self.position = *target;
                self.target = None;
            }
        }
    }

    pub fn step(&mut self, dt: f32) {
        if let Some(target) = self.target {
            self.position = self.position.step_toward(&target, self.speed * dt.max(0.0));
        }
    }

    /// Distance left to the target; `None` without one.
    pub fn remaining_distance(&self) -> Option<f32> {
        self.target.map(|t| self.position.distance(&t))
    }

    pub fn target(&self) -> Option<Position> {
        self.target
    }
}

#[derive(Debug, Clone)]
pub struct World {
    graph: Arc<ZoneGraph>,
    pub pursuer: Body,
    pub player: Body,
    player_zone: Option<ZoneId>,
    hiding: bool,
    wants_to_hide: bool,
    sight_range: f32,
}

impl World {
    pub fn new(
        graph: Arc<ZoneGraph>,
        pursuer_spawn: Position,
        player_start: Position,
        pursuer_speed: f32,
        player_speed: f32,
        sight_range: f32,
    ) -> Self {
        Self {
            graph,
            pursuer: Body::new(pursuer_spawn, pursuer_speed),
            player: Body::new(player_start, player_speed),
            player_zone: None,
            hiding: false,
            wants_to_hide: false,
            sight_range,
        }
    }

    /// Points the player at the zone of the current visit.
    pub fn steer_player(&mut self, visit: &Visit) {
        let Some(center) = self.graph.center(visit.zone) else {
            return;
        };
        if self.player.target() != Some(center) {
            self.player.apply(&MoveCommand::move_to(center));
            self.hiding = false;
        }
        self.wants_to_hide = visit.hidden;
    }

    pub fn apply(&mut self, commands: &[MoveCommand]) {
        for command in commands {
            self.pursuer.apply(command);
        }
    }

    pub fn step(&mut self, dt: f32) {
        self.player.step(dt);
        self.pursuer.step(dt);
        let settled = self
            .player
            .remaining_distance()
            .map(|d| d <= SETTLED)
            .unwrap_or(true);
        self.hiding = self.wants_to_hide && settled;
    }

    /// Zone containing `position`: by bounds first, nearest center otherwise.
    pub fn locate(&self, position: &Position) -> ZoneId {
        self.graph
            .zone_at(position)
            .unwrap_or_else(|| self.graph.nearest_zone(position))
    }

    /// Stimuli the world produces this tick.
    pub fn perceive(&mut self) -> Vec<StimulusEvent> {
        let mut events = Vec::new();
        let zone = self.locate(&self.player.position);

        if self.player_zone != Some(zone) {
            self.player_zone = Some(zone);
            events.push(StimulusEvent::PlayerZoneChanged { zone: Some(zone) });

            let watched = self.graph.zone(zone).map(|z| z.has_camera).unwrap_or(false);
            if watched && !self.hiding {
                events.push(StimulusEvent::CameraDetected { zone });
            }
        }

        if self.pursuer_sees_player() {
            events.push(StimulusEvent::DirectSight {
                position: self.player.position,
            });
        }
        events
    }

    pub fn pursuer_sees_player(&self) -> bool {
        !self.hiding
            && self.locate(&self.pursuer.position) == self.locate(&self.player.position)
            && self.player_distance() <= self.sight_range
    }

    pub fn player_distance(&self) -> f32 {
        self.pursuer.position.distance(&self.player.position)
    }

    pub fn senses(&self) -> PursuerSenses {
        PursuerSenses {
            position: self.pursuer.position,
            remaining_distance: self.pursuer.remaining_distance(),
            player_distance: Some(self.player_distance()),
        }
    }

    pub fn player_zone(&self) -> Option<ZoneId> {
        self.player_zone
    }

    pub fn is_player_hidden(&self) -> bool {
        self.hiding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lurk_events::fixtures;

    fn world(pursuer: Position, player: Position) -> World {
        World::new(Arc::new(fixtures::six_zone_line()), pursuer, player, 4.0, 3.0, 12.0)
    }

    #[test]
    fn test_body_follows_commands() {
        let mut body = Body::new(Position::default(), 2.0);
        assert_eq!(body.remaining_distance(), None);

        body.apply(&MoveCommand::move_to(Position::new(10.0, 0.0, 0.0)));
        body.step(1.0);
        assert_eq!(body.position, Position::new(2.0, 0.0, 0.0));
        assert_eq!(body.remaining_distance(), Some(8.0));

        body.apply(&MoveCommand::Stop);
        body.step(1.0);
        assert_eq!(body.position, Position::new(2.0, 0.0, 0.0));

        body.apply(&MoveCommand::warp(Position::new(-5.0, 0.0, 0.0)));
        assert_eq!(body.position, Position::new(-5.0, 0.0, 0.0));
        assert_eq!(body.remaining_distance(), None);
    }

    #[test]
    fn test_sight_needs_same_zone_and_range() {
        let mut w = world(Position::new(40.0, 0.0, 0.0), Position::new(45.0, 0.0, 0.0));
        assert!(w.pursuer_sees_player());

        // Different zone (nearest center is zone 3)
        w.player.position = Position::new(52.0, 0.0, 0.0);
        assert!(!w.pursuer_sees_player());

        // Same zone, out of range
        w.pursuer.position = Position::new(60.0, 0.0, 0.0);
        w.player.position = Position::new(60.0, 0.0, 13.0);
        assert!(!w.pursuer_sees_player());
    }

    #[test]
    fn test_zone_change_reported_once() {
        let mut w = world(Position::new(100.0, 0.0, 0.0), Position::new(1.0, 0.0, 0.0));
        let events = w.perceive();
        assert_eq!(
            events,
            vec![StimulusEvent::PlayerZoneChanged {
                zone: Some(ZoneId(0))
            }]
        );
        assert!(w.perceive().is_empty());
    }

    #[test]
    fn test_hidden_player_is_invisible_once_settled() {
        let mut w = world(Position::new(0.0, 0.0, 0.0), Position::new(18.0, 0.0, 0.0));
        w.steer_player(&Visit {
            at: 0.0,
            zone: ZoneId(1),
            hidden: true,
        });
        // Walking to the hiding spot: not hidden yet
        assert!(!w.is_player_hidden());
        for _ in 0..10 {
            w.step(0.5);
        }
        assert!(w.is_player_hidden());

        w.pursuer.position = Position::new(21.0, 0.0, 0.0);
        assert!(!w.pursuer_sees_player());
    }

    #[test]
    fn test_senses_report_distances() {
        let mut w = world(Position::new(0.0, 0.0, 0.0), Position::new(0.0, 0.0, 6.0));
        w.apply(&[MoveCommand::move_to(Position::new(0.0, 0.0, 3.0))]);
        let senses = w.senses();
        assert_eq!(senses.remaining_distance, Some(3.0));
        assert_eq!(senses.player_distance, Some(6.0));
    }
}
