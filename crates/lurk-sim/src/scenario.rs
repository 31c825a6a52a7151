//! Scripted player behavior.
//!
//! A scenario is a timetable: at each visit time the player starts walking
//! to a zone, and at each noise time something makes a sound.

use serde::{Deserialize, Serialize};
use std::path::Path;

use lurk_events::{NoiseSource, Position, ZoneGraph, ZoneId};

use crate::SimError;

const DEMO_SCENARIO: &str = include_str!("../data/demo_scenario.toml");

/// Player heads for a zone from time `at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub at: f32,
    pub zone: ZoneId,
    /// Player is tucked away and cannot be seen once there
    #[serde(default)]
    pub hidden: bool,
}

/// A sound at time `at`. Without a zone or position it comes from the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedNoise {
    pub at: f32,
    pub strength: f32,
    #[serde(default)]
    pub zone: Option<ZoneId>,
    #[serde(default)]
    pub position: Option<Position>,
}

impl ScriptedNoise {
    pub fn source(&self, player: Position) -> NoiseSource {
        match (self.zone, self.position) {
            (Some(zone), _) => NoiseSource::Zone(zone),
            (None, Some(position)) => NoiseSource::Position(position),
            (None, None) => NoiseSource::Position(player),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default = "default_duration")]
    pub duration_secs: f32,
    #[serde(default = "default_player_speed")]
    pub player_speed: f32,
    #[serde(default = "default_pursuer_speed")]
    pub pursuer_speed: f32,
    /// How far the pursuer sees within its own zone
    #[serde(default = "default_sight_range")]
    pub sight_range: f32,
    pub visits: Vec<Visit>,
    #[serde(default)]
    pub noises: Vec<ScriptedNoise>,
}

fn default_duration() -> f32 {
    120.0
}

fn default_player_speed() -> f32 {
    3.0
}

fn default_pursuer_speed() -> f32 {
    4.0
}

fn default_sight_range() -> f32 {
    12.0
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses a scenario and sorts its timetable.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SimError> {
        let mut scenario: Scenario = toml::from_str(content)?;
        scenario
            .visits
            .sort_by(|a, b| a.at.total_cmp(&b.at));
        scenario
            .noises
            .sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(scenario)
    }

    /// The built-in demo run against the demo level.
    pub fn demo() -> Result<Self, SimError> {
        Self::from_str(DEMO_SCENARIO)
    }

    /// Checks the scenario against the level it will run on.
    pub fn validate(&self, graph: &ZoneGraph) -> Result<(), SimError> {
        if self.visits.is_empty() {
            return Err(SimError::Scenario("at least one visit is required".into()));
        }
        if !(self.player_speed > 0.0 && self.pursuer_speed > 0.0) {
            return Err(SimError::Scenario("speeds must be positive".into()));
        }
        if self.sight_range < 0.0 {
            return Err(SimError::Scenario("sight_range must not be negative".into()));
        }
        for visit in &self.visits {
            if !graph.contains(visit.zone) {
                return Err(SimError::Scenario(format!(
                    "visit at {}s targets unknown zone {}",
                    visit.at, visit.zone
                )));
            }
        }
        for noise in &self.noises {
            if let Some(zone) = noise.zone {
                if !graph.contains(zone) {
                    return Err(SimError::Scenario(format!(
                        "noise at {}s comes from unknown zone {}",
                        noise.at, zone
                    )));
                }
            }
        }
        Ok(())
    }

    /// The visit in effect at time `t`: the latest one that has started,
    /// or the first one before the timetable begins.
    pub fn visit_at(&self, t: f32) -> Option<&Visit> {
        self.visits
            .iter()
            .rev()
            .find(|v| v.at <= t)
            .or_else(|| self.visits.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lurk_events::fixtures;

    #[test]
    fn test_demo_scenario_fits_demo_level() {
        let scenario = Scenario::demo().unwrap();
        let graph = crate::Level::demo().unwrap().graph().unwrap();
        scenario.validate(&graph).unwrap();
        assert!(!scenario.noises.is_empty());
    }

    #[test]
    fn test_timetable_sorted_and_defaults() {
        let toml = r#"
            name = "shuffle"

            [[visits]]
            at = 30.0
            zone = 2

            [[visits]]
            at = 0.0
            zone = 1
            hidden = true
        "#;
        let scenario = Scenario::from_str(toml).unwrap();
        assert_eq!(scenario.visits[0].zone, ZoneId(1));
        assert!(scenario.visits[0].hidden);
        assert_eq!(scenario.duration_secs, 120.0);
        assert_eq!(scenario.sight_range, 12.0);

        assert_eq!(scenario.visit_at(10.0).map(|v| v.zone), Some(ZoneId(1)));
        assert_eq!(scenario.visit_at(30.0).map(|v| v.zone), Some(ZoneId(2)));
    }

    #[test]
    fn test_rejects_unknown_zone() {
        let toml = r#"
            name = "lost"

            [[visits]]
            at = 0.0
            zone = 17
        "#;
        let scenario = Scenario::from_str(toml).unwrap();
        let graph = fixtures::six_zone_line();
        assert!(matches!(
            scenario.validate(&graph),
            Err(SimError::Scenario(_))
        ));
    }

    #[test]
    fn test_noise_source() {
        let player = Position::new(1.0, 0.0, 1.0);
        let from_player = ScriptedNoise {
            at: 0.0,
            strength: 1.0,
            zone: None,
            position: None,
        };
        assert_eq!(from_player.source(player), NoiseSource::Position(player));

        let from_zone = ScriptedNoise {
            zone: Some(ZoneId(3)),
            ..from_player.clone()
        };
        assert_eq!(from_zone.source(player), NoiseSource::Zone(ZoneId(3)));
    }
}
