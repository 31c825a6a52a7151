//! Simulation Clock
//!
//! The decision core works on simulated seconds, never on wall-clock time.
//! Every timeout (lease TTL, search duration, rest timer) is a plain
//! comparison against this clock.
//!
//! # Example
//!
//! ```
//! use lurk_events::SimTime;
//!
//! let mut time = SimTime::start();
//! time.advance(0.5);
//! time.advance(0.5);
//! assert_eq!(time.tick, 2);
//! assert_eq!(time.seconds, 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of orchestrator ticks so far
    pub tick: u64,
    /// Simulated seconds since start
    pub seconds: f32,
}

impl SimTime {
    pub fn new(tick: u64, seconds: f32) -> Self {
        Self { tick, seconds }
    }

    /// Time zero.
    pub fn start() -> Self {
        Self::default()
    }

    /// Advances by one tick of `dt` seconds. Negative `dt` counts as zero.
    pub fn advance(&mut self, dt: f32) {
        self.tick += 1;
        self.seconds += dt.max(0.0);
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.2}s (tick {})", self.seconds, self.tick)
    }
}
