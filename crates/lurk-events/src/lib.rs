//! Shared data types for the lurker decision core.
//!
//! This crate contains pure data structures with no decision logic: the zone
//! graph supplied by the level loader, inbound stimuli, outbound movement
//! commands, the simulation clock and debug snapshots. It is a dependency for
//! all other crates in the workspace.

pub mod command;
pub mod event;
pub mod snapshot;
pub mod timestamp;
pub mod zone;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export zone types
pub use zone::{Bounds, Position, ZoneDef, ZoneGraph, ZoneGraphError, ZoneId, ZonePoints};

// Re-export event types
pub use event::{NoiseSource, StimulusEvent};

// Re-export command types
pub use command::MoveCommand;

// Re-export clock types
pub use timestamp::SimTime;

// Re-export snapshot types
pub use snapshot::{DutyPhase, LeaseSnapshot, OverseerSnapshot, PursuerState, ZoneHeat};
