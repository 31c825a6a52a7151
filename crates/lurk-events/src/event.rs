//! Stimulus Types
//!
//! Inbound facts reported by world collaborators (trigger volumes, cameras,
//! audio, perception). None of them carry the player's position except a
//! direct sighting, which is by definition something the pursuer saw.

use serde::{Deserialize, Serialize};

use crate::zone::{Position, ZoneId};

/// Where a noise came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseSource {
    /// Only the zone is known
    Zone(ZoneId),
    /// Audio system reported a world position
    Position(Position),
}

/// An environmental event that feeds the decision core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StimulusEvent {
    /// Player stayed in a zone long enough to count as camping
    PlayerLingered { zone: ZoneId },
    /// Something made a sound; `strength` scales both heat and hearing range
    NoiseHeard { source: NoiseSource, strength: f32 },
    /// A security camera spotted the player
    CameraDetected { zone: ZoneId },
    /// The pursuer's own perception sees the player this frame
    DirectSight { position: Position },
    /// Containment collaborator reports which zone the player is in
    PlayerZoneChanged { zone: Option<ZoneId> },
}

impl StimulusEvent {
    /// Short lowercase name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StimulusEvent::PlayerLingered { .. } => "player_lingered",
            StimulusEvent::NoiseHeard { .. } => "noise_heard",
            StimulusEvent::CameraDetected { .. } => "camera_detected",
            StimulusEvent::DirectSight { .. } => "direct_sight",
            StimulusEvent::PlayerZoneChanged { .. } => "player_zone_changed",
        }
    }

    /// Zone named by the event, if it names one directly.
    pub fn zone(&self) -> Option<ZoneId> {
        match self {
            StimulusEvent::PlayerLingered { zone } | StimulusEvent::CameraDetected { zone } => {
                Some(*zone)
            }
            StimulusEvent::NoiseHeard {
                source: NoiseSource::Zone(zone),
                ..
            } => Some(*zone),
            StimulusEvent::PlayerZoneChanged { zone } => *zone,
            _ => None,
        }
    }

    /// Parses a single JSONL line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Serializes to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = StimulusEvent::CameraDetected { zone: ZoneId(4) };
        let json = event.to_jsonl().unwrap();
        assert_eq!(json, r#"{"type":"camera_detected","zone":4}"#);
    }

    #[test]
    fn test_noise_from_jsonl() {
        let line = r#"{"type":"noise_heard","source":{"position":{"x":1.0,"y":0.0,"z":2.0}},"strength":0.5}"#;
        let event = StimulusEvent::from_jsonl(line).unwrap();
        match event {
            StimulusEvent::NoiseHeard {
                source: NoiseSource::Position(p),
                strength,
            } => {
                assert_eq!(p, Position::new(1.0, 0.0, 2.0));
                assert_eq!(strength, 0.5);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_event_zone() {
        assert_eq!(
            StimulusEvent::PlayerLingered { zone: ZoneId(2) }.zone(),
            Some(ZoneId(2))
        );
        assert_eq!(
            StimulusEvent::DirectSight {
                position: Position::default()
            }
            .zone(),
            None
        );
        assert_eq!(StimulusEvent::PlayerZoneChanged { zone: None }.zone(), None);
    }
}
