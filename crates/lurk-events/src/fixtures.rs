//! Sample zone graphs for testing.
//!
//! Enable the `test-fixtures` feature to use these from other crates.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // lurk-events = { path = "../lurk-events", features = ["test-fixtures"] }
//!
//! use lurk_events::fixtures;
//!
//! let graph = fixtures::six_zone_line();
//! ```

use crate::{Position, ZoneDef, ZoneGraph};

/// Six zones in a row, 20 units apart: 0-1-2-3-4-5.
///
/// Every zone has a vent 5 units off its center and one patrol point at its
/// center, so the patrol route visits all six zones in order.
pub fn six_zone_line() -> ZoneGraph {
    let zones = (0..6u16)
        .map(|i| {
            let center = Position::new(i as f32 * 20.0, 0.0, 0.0);
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push(i - 1);
            }
            if i < 5 {
                neighbors.push(i + 1);
            }
            ZoneDef::new(i, format!("zone_{}", i), center)
                .with_neighbors(&neighbors)
                .with_patrol(vec![center])
                .with_vent(center.offset_planar(0.0, 5.0))
        })
        .collect();
    ZoneGraph::new(zones).expect("six_zone_line fixture is valid")
}

/// Same layout as [`six_zone_line`] without patrol points, so the pursuer
/// idles instead of patrolling.
pub fn six_zone_line_without_patrol() -> ZoneGraph {
    let zones = six_zone_line()
        .zones()
        .iter()
        .cloned()
        .map(|mut z| {
            z.points.patrol.clear();
            z
        })
        .collect();
    ZoneGraph::new(zones).expect("six_zone_line_without_patrol fixture is valid")
}

/// A single isolated zone.
pub fn single_zone() -> ZoneGraph {
    ZoneGraph::new(vec![ZoneDef::new(0, "cell", Position::default())])
        .expect("single_zone fixture is valid")
}
