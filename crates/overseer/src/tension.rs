//! Tension Controller
//!
//! Aggregates "pursuer is chasing" and "pursuer is close to the player" into a
//! scalar in `[0, 100]`. Tension paces how often search hints are handed out
//! and drives the active/dormant duty cycle.

use tracing::{debug, info};

use lurk_events::DutyPhase;

use crate::config::TensionConfig;

pub const TENSION_MAX: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct TensionController {
    config: TensionConfig,
    tension: f32,
    is_chasing: bool,
    is_close: bool,
    phase: DutyPhase,
    /// Seconds spent in the current phase
    phase_elapsed: f32,
    /// Countdown to the next hint; due at or below zero
    next_hint_in: f32,
}

impl TensionController {
    pub fn new(config: TensionConfig) -> Self {
        Self {
            config,
            tension: 0.0,
            is_chasing: false,
            is_close: false,
            phase: DutyPhase::Active,
            phase_elapsed: 0.0,
            next_hint_in: 0.0,
        }
    }

    /// Advances tension and the duty cycle. Returns the new phase when it
    /// changed this tick.
    pub fn tick(&mut self, dt: f32) -> Option<DutyPhase> {
        if dt <= 0.0 {
            return None;
        }

        let delta = if self.is_engaged() {
            self.config.increase_per_sec * dt
        } else {
            -self.config.decrease_per_sec * dt
        };
        self.tension = (self.tension + delta).clamp(0.0, TENSION_MAX);
        self.phase_elapsed += dt;
        self.next_hint_in -= dt;

        match self.phase {
            DutyPhase::Active => {
                let overheated = self.tension >= self.config.high_threshold;
                let shift_over = self.config.active_duration_secs > 0.0
                    && self.phase_elapsed >= self.config.active_duration_secs
                    && !self.is_chasing;
                if overheated || shift_over {
                    info!(
                        tension = self.tension,
                        overheated, "pursuer going dormant"
                    );
                    self.enter(DutyPhase::Dormant);
                    return Some(DutyPhase::Dormant);
                }
            }
            DutyPhase::Dormant => {
                if self.phase_elapsed >= self.config.rest_duration_secs
                    && self.tension <= self.config.low_threshold
                {
                    info!(tension = self.tension, "pursuer active again");
                    self.enter(DutyPhase::Active);
                    return Some(DutyPhase::Active);
                }
            }
        }
        None
    }

    fn enter(&mut self, phase: DutyPhase) {
        self.phase = phase;
        self.phase_elapsed = 0.0;
        self.next_hint_in = 0.0;
    }

    /// Consumes a due hint. Only ever true while Active; the countdown then
    /// restarts at the current hint interval.
    pub fn take_hint(&mut self) -> bool {
        if self.phase != DutyPhase::Active || self.next_hint_in > 0.0 {
            return false;
        }
        self.next_hint_in = self.hint_interval();
        true
    }

    /// Seconds between hints: long when calm, short near the high threshold.
    pub fn hint_interval(&self) -> f32 {
        let t = if self.config.high_threshold > 0.0 {
            (self.tension / self.config.high_threshold).clamp(0.0, 1.0)
        } else {
            1.0
        };
        lerp(
            self.config.hint_interval_max_secs,
            self.config.hint_interval_min_secs,
            t,
        )
    }

    /// Returns true if the flag actually changed.
    pub fn report_chase_state_changed(&mut self, chasing: bool) -> bool {
        if self.is_chasing == chasing {
            return false;
        }
        self.is_chasing = chasing;
        debug!(chasing, tension = self.tension, "chase state reported");
        true
    }

    /// Returns true if the flag actually changed.
    pub fn report_close_to_player_changed(&mut self, close: bool) -> bool {
        if self.is_close == close {
            return false;
        }
        self.is_close = close;
        debug!(close, tension = self.tension, "proximity reported");
        true
    }

    pub fn tension(&self) -> f32 {
        self.tension
    }

    pub fn phase(&self) -> DutyPhase {
        self.phase
    }

    pub fn is_chasing(&self) -> bool {
        self.is_chasing
    }

    pub fn is_close_to_player(&self) -> bool {
        self.is_close
    }

    fn is_engaged(&self) -> bool {
        self.is_chasing || self.is_close
    }
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
