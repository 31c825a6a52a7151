//! Zone Graph Types
//!
//! The fixed set of zones a level is divided into. Built once by the level
//! loader and shared read-only with every decision component.
//!
//! # Example
//!
//! ```
//! use lurk_events::{Position, ZoneDef, ZoneGraph, ZoneId};
//!
//! let graph = ZoneGraph::new(vec![
//!     ZoneDef::new(0, "hangar", Position::new(0.0, 0.0, 0.0)).with_neighbors(&[1]),
//!     ZoneDef::new(1, "galley", Position::new(20.0, 0.0, 0.0)).with_neighbors(&[0]),
//! ])
//! .unwrap();
//!
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.neighbors(ZoneId(0)), &[ZoneId(1)]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Stable zone identifier in `[0, N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u16);

impl ZoneId {
    /// Returns the id as an array index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone_{:02}", self.0)
    }
}

impl From<u16> for ZoneId {
    fn from(id: u16) -> Self {
        ZoneId(id)
    }
}

/// World-space point. The core only stores and forwards these.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Position) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Returns this point shifted on the ground plane.
    pub fn offset_planar(&self, dx: f32, dz: f32) -> Position {
        Position::new(self.x + dx, self.y, self.z + dz)
    }

    /// Moves toward `target` by at most `step`, never overshooting.
    pub fn step_toward(&self, target: &Position, step: f32) -> Position {
        let dist = self.distance(target);
        if dist <= step || dist <= f32::EPSILON {
            return *target;
        }
        let t = step / dist;
        Position::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
            self.z + (target.z - self.z) * t,
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Axis-aligned box used by the containment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Position) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

/// Named points inside a zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePoints {
    /// Where investigations head to
    pub center: Position,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patrol: Vec<Position>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub investigate: Vec<Position>,
    /// Egress point the pursuer despawns into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vent: Option<Position>,
}

/// A single zone as supplied by the level loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDef {
    pub id: ZoneId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub neighbors: Vec<ZoneId>,
    pub points: ZonePoints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    /// Zone is watched by a security camera
    #[serde(default)]
    pub has_camera: bool,
}

impl ZoneDef {
    /// Creates a zone with only a center point.
    pub fn new(id: u16, name: impl Into<String>, center: Position) -> Self {
        Self {
            id: ZoneId(id),
            name: name.into(),
            neighbors: Vec::new(),
            points: ZonePoints {
                center,
                ..ZonePoints::default()
            },
            bounds: None,
            has_camera: false,
        }
    }

    pub fn with_neighbors(mut self, neighbors: &[u16]) -> Self {
        self.neighbors = neighbors.iter().copied().map(ZoneId).collect();
        self
    }

    pub fn with_patrol(mut self, points: Vec<Position>) -> Self {
        self.points.patrol = points;
        self
    }

    pub fn with_vent(mut self, vent: Position) -> Self {
        self.points.vent = Some(vent);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_camera(mut self) -> Self {
        self.has_camera = true;
        self
    }
}

/// Errors raised while validating a zone graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoneGraphError {
    #[error("zone graph has no zones")]
    Empty,

    #[error("zone {0} is defined more than once")]
    DuplicateZone(ZoneId),

    #[error("zone ids must be contiguous from 0, {0} is missing")]
    MissingZone(ZoneId),

    #[error("zone {zone} lists neighbor {neighbor} which does not exist")]
    NeighborOutOfRange { zone: ZoneId, neighbor: ZoneId },

    #[error("zone {0} lists itself as a neighbor")]
    SelfLoop(ZoneId),

    #[error("zone {zone} lists neighbor {neighbor} twice")]
    DuplicateNeighbor { zone: ZoneId, neighbor: ZoneId },

    #[error("zone {zone} lists {neighbor} as a neighbor but not the other way round")]
    Asymmetric { zone: ZoneId, neighbor: ZoneId },
}

/// Validated, immutable zone graph indexed by zone id.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGraph {
    zones: Vec<ZoneDef>,
}

impl ZoneGraph {
    /// Builds a graph, checking ids, adjacency symmetry and self-loops.
    ///
    /// Zones may be supplied in any order; they are stored by id.
    pub fn new(mut zones: Vec<ZoneDef>) -> Result<Self, ZoneGraphError> {
        if zones.is_empty() {
            return Err(ZoneGraphError::Empty);
        }

        zones.sort_by_key(|z| z.id);
        for (index, zone) in zones.iter().enumerate() {
            let expected = ZoneId(index as u16);
            if zone.id < expected {
                return Err(ZoneGraphError::DuplicateZone(zone.id));
            }
            if zone.id > expected {
                return Err(ZoneGraphError::MissingZone(expected));
            }
        }

        let count = zones.len();
        for zone in &zones {
            let mut seen = HashSet::new();
            for &neighbor in &zone.neighbors {
                if neighbor.index() >= count {
                    return Err(ZoneGraphError::NeighborOutOfRange {
                        zone: zone.id,
                        neighbor,
                    });
                }
                if neighbor == zone.id {
                    return Err(ZoneGraphError::SelfLoop(zone.id));
                }
                if !seen.insert(neighbor) {
                    return Err(ZoneGraphError::DuplicateNeighbor {
                        zone: zone.id,
                        neighbor,
                    });
                }
            }
        }

        for zone in &zones {
            for &neighbor in &zone.neighbors {
                if !zones[neighbor.index()].neighbors.contains(&zone.id) {
                    return Err(ZoneGraphError::Asymmetric {
                        zone: zone.id,
                        neighbor,
                    });
                }
            }
        }

        Ok(Self { zones })
    }

    /// Number of zones. Never zero.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn contains(&self, id: ZoneId) -> bool {
        id.index() < self.zones.len()
    }

    pub fn zone(&self, id: ZoneId) -> Option<&ZoneDef> {
        self.zones.get(id.index())
    }

    pub fn zones(&self) -> &[ZoneDef] {
        &self.zones
    }

    pub fn ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.iter().map(|z| z.id)
    }

    /// Neighbors of a zone; empty for unknown ids.
    pub fn neighbors(&self, id: ZoneId) -> &[ZoneId] {
        self.zone(id).map(|z| z.neighbors.as_slice()).unwrap_or(&[])
    }

    pub fn center(&self, id: ZoneId) -> Option<Position> {
        self.zone(id).map(|z| z.points.center)
    }

    /// Zone whose center is closest to `pos`; ties go to the lowest id.
    pub fn nearest_zone(&self, pos: &Position) -> ZoneId {
        let mut best = self.zones[0].id;
        let mut best_dist = f32::MAX;
        for zone in &self.zones {
            let dist = zone.points.center.distance_squared(pos);
            if dist < best_dist {
                best_dist = dist;
                best = zone.id;
            }
        }
        best
    }

    /// First zone whose bounds contain `pos`.
    pub fn zone_at(&self, pos: &Position) -> Option<ZoneId> {
        self.zones
            .iter()
            .find(|z| z.bounds.map(|b| b.contains(pos)).unwrap_or(false))
            .map(|z| z.id)
    }

    /// All patrol points in zone order.
    pub fn patrol_route(&self) -> Vec<Position> {
        self.zones
            .iter()
            .flat_map(|z| z.points.patrol.iter().copied())
            .collect()
    }

    /// Vent points keyed by the zone they belong to.
    pub fn vents(&self) -> impl Iterator<Item = (ZoneId, Position)> + '_ {
        self.zones
            .iter()
            .filter_map(|z| z.points.vent.map(|v| (z.id, v)))
    }
}
