//! Suspicion Field
//!
//! One heat value per zone, clamped to `[0, max]`. Stimuli raise it, a fixed
//! cadence decays it linearly, and a fruitless search scales a zone down.
//! Unknown zone ids read as 0 and writes to them are dropped.

use std::sync::Arc;

use lurk_events::{ZoneGraph, ZoneHeat, ZoneId};

use crate::config::SuspicionConfig;

#[derive(Debug, Clone)]
pub struct SuspicionField {
    graph: Arc<ZoneGraph>,
    values: Vec<f32>,
    max: f32,
    decay_per_sec: f32,
}

impl SuspicionField {
    pub fn new(graph: Arc<ZoneGraph>, config: &SuspicionConfig) -> Self {
        let values = vec![0.0; graph.len()];
        Self {
            graph,
            values,
            max: config.max,
            decay_per_sec: config.decay_per_sec,
        }
    }

    /// Linear decay toward zero. `dt <= 0` leaves the field untouched.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let step = self.decay_per_sec * dt;
        for value in &mut self.values {
            *value = (*value - step).max(0.0);
        }
    }

    /// Adds to a single zone and returns whether the zone exists.
    pub fn add_direct(&mut self, zone: ZoneId, amount: f32) -> bool {
        let max = self.max;
        match self.values.get_mut(zone.index()) {
            Some(value) => {
                *value = (*value + amount).clamp(0.0, max);
                true
            }
            None => false,
        }
    }

    /// Adds `amount` to `zone` and `amount * ratio` to each of its neighbors.
    ///
    /// Non-positive amounts are ignored.
    pub fn add_with_spread(&mut self, zone: ZoneId, amount: f32, ratio: f32) -> bool {
        if amount <= 0.0 || !self.graph.contains(zone) {
            return false;
        }
        self.add_direct(zone, amount);

        let spread = amount * ratio;
        if spread > 0.0 {
            let graph = Arc::clone(&self.graph);
            for &neighbor in graph.neighbors(zone) {
                self.add_direct(neighbor, spread);
            }
        }
        true
    }

    /// Scales one zone by `factor` (negative factors count as 0).
    pub fn multiply_zone(&mut self, zone: ZoneId, factor: f32) -> bool {
        let max = self.max;
        match self.values.get_mut(zone.index()) {
            Some(value) => {
                *value = (*value * factor.max(0.0)).clamp(0.0, max);
                true
            }
            None => false,
        }
    }

    pub fn value(&self, zone: ZoneId) -> f32 {
        self.values.get(zone.index()).copied().unwrap_or(0.0)
    }

    /// Zone with the highest suspicion. Ties go to the lowest id, so a quiet
    /// field reports zone 0.
    pub fn hottest_zone(&self) -> ZoneId {
        let mut best = 0;
        for (index, &value) in self.values.iter().enumerate() {
            if value > self.values[best] {
                best = index;
            }
        }
        ZoneId(best as u16)
    }

    pub fn reset_all(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0.0);
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn zone_count(&self) -> usize {
        self.values.len()
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn graph(&self) -> &ZoneGraph {
        &self.graph
    }

    pub fn heat_map(&self) -> Vec<ZoneHeat> {
        self.values
            .iter()
            .enumerate()
            .map(|(index, &suspicion)| ZoneHeat {
                zone: ZoneId(index as u16),
                suspicion,
            })
            .collect()
    }
}
