//! Snapshot Types
//!
//! Read-only views of the decision core for debug panels and replay logs.
//! Snapshots are written one per line by the scenario runner.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timestamp::SimTime;
use crate::zone::ZoneId;

/// Behavior state of the pursuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PursuerState {
    /// No patrol route and nothing to do
    #[default]
    Idle,
    /// Walking the patrol route
    Patrol,
    /// Heading to a hinted zone or a noise
    Investigate,
    /// Has eyes on the player
    Chase,
    /// Sweeping around the last known position
    Search,
    /// Commanded to rest; not moving
    Stopped,
}

impl PursuerState {
    /// States in which the pursuer accepts a new search job.
    pub fn is_available(self) -> bool {
        matches!(self, PursuerState::Idle | PursuerState::Patrol)
    }
}

impl fmt::Display for PursuerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PursuerState::Idle => "idle",
            PursuerState::Patrol => "patrol",
            PursuerState::Investigate => "investigate",
            PursuerState::Chase => "chase",
            PursuerState::Search => "search",
            PursuerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Global duty-cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DutyPhase {
    /// Pursuer is hunting and jobs are handed out
    #[default]
    Active,
    /// Forced rest; pursuer stopped, no jobs
    Dormant,
}

impl fmt::Display for DutyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DutyPhase::Active => f.write_str("active"),
            DutyPhase::Dormant => f.write_str("dormant"),
        }
    }
}

/// Suspicion of one zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneHeat {
    pub zone: ZoneId,
    pub suspicion: f32,
}

/// The lease currently held by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeaseSnapshot {
    pub lease_id: u64,
    pub zone: ZoneId,
    pub priority: f32,
    pub issued_at: f32,
    pub expires_at: f32,
}

/// Full debug view of the decision core at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverseerSnapshot {
    pub time: SimTime,
    pub zones: Vec<ZoneHeat>,
    pub tension: f32,
    pub phase: DutyPhase,
    pub pursuer_state: PursuerState,
    pub urgency: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease: Option<LeaseSnapshot>,
}

impl OverseerSnapshot {
    /// Suspicion of a zone in this snapshot; 0 for unknown zones.
    pub fn suspicion(&self, zone: ZoneId) -> f32 {
        self.zones
            .iter()
            .find(|h| h.zone == zone)
            .map(|h| h.suspicion)
            .unwrap_or(0.0)
    }

    /// Serializes to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
