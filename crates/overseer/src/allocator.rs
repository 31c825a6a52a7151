//! Job Allocator
//!
//! Turns the suspicion field into a single leased search target. While a
//! lease is live every request returns it unchanged; once it expires a new
//! target is drawn by weighted roulette over the Top-K hottest zones.

use rand::Rng;
use tracing::debug;

use lurk_events::{LeaseSnapshot, ZoneId};

use crate::config::AllocatorConfig;
use crate::suspicion::SuspicionField;

const MIN_ROULETTE_POWER: f32 = 0.1;
const MIN_LEASE_TTL: f32 = 0.1;

/// A time-boxed assignment of one zone as the search target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchJob {
    /// Increases by one for every lease the allocator issues
    pub lease_id: u64,
    pub zone: ZoneId,
    /// Suspicion of the zone when the lease was issued
    pub priority: f32,
    pub issued_at: f32,
    pub expires_at: f32,
}

impl SearchJob {
    /// `now == expires_at` already counts as expired.
    pub fn is_expired(&self, now: f32) -> bool {
        now >= self.expires_at
    }

    pub fn snapshot(&self) -> LeaseSnapshot {
        LeaseSnapshot {
            lease_id: self.lease_id,
            zone: self.zone,
            priority: self.priority,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
        }
    }
}

/// One slot of the Top-K shortlist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub zone: ZoneId,
    pub value: f32,
    /// `value^power`, or 0 when the zone is below the minimum priority
    pub weight: f32,
    pub eligible: bool,
}

/// Builds the Top-K shortlist from raw zone values.
///
/// Zones are ordered by value descending with ties kept in id order. A zone
/// under `min_priority` stays in its slot but can never be drawn.
pub fn build_shortlist(values: &[f32], config: &AllocatorConfig) -> Vec<Candidate> {
    if values.is_empty() {
        return Vec::new();
    }

    let power = config.roulette_power.max(MIN_ROULETTE_POWER);
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let k = config.top_k.clamp(1, values.len());
    order
        .into_iter()
        .take(k)
        .map(|index| {
            let value = values[index];
            let eligible = config.min_priority <= 0.0 || value >= config.min_priority;
            let weight = if eligible {
                value.max(0.0).powf(power)
            } else {
                0.0
            };
            Candidate {
                zone: ZoneId(index as u16),
                value,
                weight,
                eligible,
            }
        })
        .collect()
}

/// Total drawable weight of a shortlist.
pub fn total_weight(shortlist: &[Candidate]) -> f32 {
    shortlist
        .iter()
        .filter(|c| c.eligible)
        .map(|c| c.weight)
        .sum()
}

/// Walks the shortlist subtracting weights from `roll` until it drops to
/// zero. If rounding leaves `roll` positive after the walk, the first
/// eligible candidate wins.
pub fn spin(shortlist: &[Candidate], roll: f32) -> Option<&Candidate> {
    let mut remaining = roll;
    for candidate in shortlist.iter().filter(|c| c.eligible && c.weight > 0.0) {
        remaining -= candidate.weight;
        if remaining <= 0.0 {
            return Some(candidate);
        }
    }
    shortlist.iter().find(|c| c.eligible)
}

#[derive(Debug, Clone)]
pub struct JobAllocator {
    config: AllocatorConfig,
    current: Option<SearchJob>,
    next_lease_id: u64,
}

impl JobAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self {
            config,
            current: None,
            next_lease_id: 1,
        }
    }

    /// Returns the live lease, or draws a new one.
    ///
    /// `None` means the world is quiet: no eligible zone has any weight.
    pub fn request_job<R: Rng + ?Sized>(
        &mut self,
        field: &SuspicionField,
        now: f32,
        rng: &mut R,
    ) -> Option<SearchJob> {
        if let Some(job) = self.current {
            if !job.is_expired(now) {
                return Some(job);
            }
            debug!(lease_id = job.lease_id, zone = %job.zone, "lease expired");
            self.current = None;
        }

        let shortlist = build_shortlist(field.values(), &self.config);
        let total = total_weight(&shortlist);
        if total <= 0.0 {
            return None;
        }

        let roll = rng.gen::<f32>() * total;
        let zone = spin(&shortlist, roll)?.zone;

        let job = SearchJob {
            lease_id: self.next_lease_id,
            zone,
            priority: field.value(zone),
            issued_at: now,
            expires_at: now + self.config.lease_ttl_secs.max(MIN_LEASE_TTL),
        };
        self.next_lease_id += 1;
        self.current = Some(job);

        debug!(
            lease_id = job.lease_id,
            zone = %job.zone,
            priority = job.priority,
            expires_at = job.expires_at,
            "lease issued"
        );
        Some(job)
    }

    /// The held lease if it is still valid at `now`.
    pub fn current_job(&self, now: f32) -> Option<SearchJob> {
        self.current.filter(|job| !job.is_expired(now))
    }

    /// The held lease regardless of expiry.
    pub fn held_job(&self) -> Option<SearchJob> {
        self.current
    }

    pub fn clear_job(&mut self) {
        self.current = None;
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuspicionConfig;
    use lurk_events::fixtures;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn field() -> SuspicionField {
        SuspicionField::new(
            Arc::new(fixtures::six_zone_line()),
            &SuspicionConfig::default(),
        )
    }

    fn config(top_k: usize, power: f32, min_priority: f32) -> AllocatorConfig {
        AllocatorConfig {
            top_k,
            roulette_power: power,
            min_priority,
            lease_ttl_secs: 8.0,
        }
    }

    #[test]
    fn test_quiet_world_has_no_job() {
        let field = field();
        let mut allocator = JobAllocator::new(AllocatorConfig::default());
        let mut rng = SmallRng::seed_from_u64(1);

        assert!(allocator.request_job(&field, 0.0, &mut rng).is_none());
        assert!(allocator.current_job(0.0).is_none());
    }

    #[test]
    fn test_lease_reused_until_expiry() {
        let mut field = field();
        field.add_with_spread(ZoneId(2), 10.0, 0.2);
        let mut allocator = JobAllocator::new(AllocatorConfig::default());
        let mut rng = SmallRng::seed_from_u64(7);

        let first = allocator.request_job(&field, 1.0, &mut rng).unwrap();
        let second = allocator.request_job(&field, 1.0, &mut rng).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.expires_at, 9.0);

        // Still the same lease just before expiry
        let third = allocator.request_job(&field, 8.99, &mut rng).unwrap();
        assert_eq!(third.lease_id, first.lease_id);

        // Expiry is inclusive
        assert!(allocator.current_job(9.0).is_none());
        let fresh = allocator.request_job(&field, 9.0, &mut rng).unwrap();
        assert_eq!(fresh.lease_id, first.lease_id + 1);
        assert_eq!(fresh.issued_at, 9.0);
    }

    #[test]
    fn test_single_hot_zone_always_selected() {
        let mut field = field();
        field.add_direct(ZoneId(4), 3.0);
        let mut allocator = JobAllocator::new(AllocatorConfig::default());
        let mut rng = SmallRng::seed_from_u64(99);

        for i in 0..200 {
            allocator.clear_job();
            let job = allocator.request_job(&field, i as f32, &mut rng).unwrap();
            assert_eq!(job.zone, ZoneId(4));
            assert_eq!(job.priority, 3.0);
        }
    }

    #[test]
    fn test_roulette_frequency_matches_weights() {
        let mut field = field();
        field.add_with_spread(ZoneId(2), 10.0, 0.2);
        let mut allocator = JobAllocator::new(config(3, 1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(12345);

        let trials = 7000;
        let mut hits = 0;
        for _ in 0..trials {
            allocator.clear_job();
            if allocator.request_job(&field, 0.0, &mut rng).unwrap().zone == ZoneId(2) {
                hits += 1;
            }
        }

        let freq = hits as f32 / trials as f32;
        assert!(
            (freq - 5.0 / 7.0).abs() < 0.03,
            "zone 2 picked with frequency {}",
            freq
        );
    }

    #[test]
    fn test_shortlist_order_and_ties() {
        let values = [0.0, 2.0, 10.0, 2.0, 0.0, 0.0];
        let shortlist = build_shortlist(&values, &config(3, 1.0, 0.0));

        let zones: Vec<_> = shortlist.iter().map(|c| c.zone).collect();
        assert_eq!(zones, vec![ZoneId(2), ZoneId(1), ZoneId(3)]);
        assert_eq!(total_weight(&shortlist), 14.0);
    }

    #[test]
    fn test_top_k_clamped() {
        let values = [1.0, 2.0];
        assert_eq!(build_shortlist(&values, &config(0, 1.0, 0.0)).len(), 1);
        assert_eq!(build_shortlist(&values, &config(10, 1.0, 0.0)).len(), 2);
    }

    #[test]
    fn test_power_floor() {
        let values = [4.0];
        let shortlist = build_shortlist(&values, &config(1, -2.0, 0.0));
        assert!((shortlist[0].weight - 4.0f32.powf(0.1)).abs() < 1e-6);
    }

    #[test]
    fn test_min_priority_keeps_slot_but_never_drawn() {
        let values = [30.0, 5.0, 20.0];
        let shortlist = build_shortlist(&values, &config(3, 1.0, 10.0));

        assert_eq!(shortlist[2].zone, ZoneId(1));
        assert!(!shortlist[2].eligible);
        assert_eq!(shortlist[2].weight, 0.0);
        assert_eq!(total_weight(&shortlist), 50.0);

        // A roll past every eligible weight falls back to the first eligible
        assert_eq!(spin(&shortlist, 1000.0).map(|c| c.zone), Some(ZoneId(0)));
    }

    #[test]
    fn test_everything_below_min_priority_is_quiet() {
        let mut field = field();
        field.add_direct(ZoneId(1), 4.0);
        let mut allocator = JobAllocator::new(config(3, 1.0, 5.0));
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(allocator.request_job(&field, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_spin_walks_weights() {
        let values = [0.0, 2.0, 10.0, 2.0];
        let shortlist = build_shortlist(&values, &config(3, 1.0, 0.0));

        assert_eq!(spin(&shortlist, 0.0).map(|c| c.zone), Some(ZoneId(2)));
        assert_eq!(spin(&shortlist, 10.0).map(|c| c.zone), Some(ZoneId(2)));
        assert_eq!(spin(&shortlist, 11.0).map(|c| c.zone), Some(ZoneId(1)));
        assert_eq!(spin(&shortlist, 13.5).map(|c| c.zone), Some(ZoneId(3)));
        assert_eq!(spin(&[], 1.0), None);
    }

    #[test]
    fn test_ttl_floor() {
        let mut field = field();
        field.add_direct(ZoneId(0), 1.0);
        let mut allocator = JobAllocator::new(AllocatorConfig {
            lease_ttl_secs: 0.0,
            ..AllocatorConfig::default()
        });
        let mut rng = SmallRng::seed_from_u64(5);
        let job = allocator.request_job(&field, 2.0, &mut rng).unwrap();
        assert!((job.expires_at - 2.1).abs() < 1e-6);
    }

    #[test]
    fn test_clear_job() {
        let mut field = field();
        field.add_direct(ZoneId(0), 1.0);
        let mut allocator = JobAllocator::new(AllocatorConfig::default());
        let mut rng = SmallRng::seed_from_u64(5);
        allocator.request_job(&field, 0.0, &mut rng);
        allocator.clear_job();
        assert!(allocator.held_job().is_none());
    }
}
