//! Player stay tracking.
//!
//! Converts continuous presence in one zone into periodic lingered reports.
//! The accumulator keeps the overshoot, so a player who camps for `3n`
//! seconds produces `n` reports at a 3 second threshold.

use tracing::debug;

use lurk_events::ZoneId;

use crate::config::StayConfig;

#[derive(Debug, Clone)]
pub struct StayTracker {
    threshold: f32,
    enabled: bool,
    zone: Option<ZoneId>,
    elapsed: f32,
}

impl StayTracker {
    pub fn new(config: &StayConfig) -> Self {
        Self {
            threshold: config.threshold_secs,
            enabled: config.enabled,
            zone: None,
            elapsed: 0.0,
        }
    }

    /// Records the zone the player is in. Changing zone restarts the count.
    pub fn set_zone(&mut self, zone: Option<ZoneId>) {
        if self.zone != zone {
            self.zone = zone;
            self.elapsed = 0.0;
        }
    }

    /// Accumulates presence and returns the zone to report once the
    /// threshold is crossed.
    pub fn tick(&mut self, dt: f32) -> Option<ZoneId> {
        if !self.enabled || dt <= 0.0 {
            return None;
        }
        let zone = self.zone?;

        self.elapsed += dt;
        if self.elapsed >= self.threshold {
            self.elapsed -= self.threshold;
            debug!(%zone, "player lingering");
            return Some(zone);
        }
        None
    }

    /// Toggling reporting in either direction restarts the count.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.elapsed = 0.0;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn zone(&self) -> Option<ZoneId> {
        self.zone
    }
}
