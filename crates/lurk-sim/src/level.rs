//! Level loading.
//!
//! A level is a TOML file listing zones with their neighbors, named points,
//! bounds and cameras. The zone definitions deserialize straight into
//! [`ZoneDef`]; validation happens when the graph is built.

use serde::{Deserialize, Serialize};
use std::path::Path;

use lurk_events::{Position, ZoneDef, ZoneGraph};

use crate::SimError;

const DEMO_LEVEL: &str = include_str!("../data/demo_level.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Where the pursuer starts; defaults to the first patrol point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pursuer_spawn: Option<Position>,
    pub zones: Vec<ZoneDef>,
}

impl Level {
    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SimError> {
        Ok(toml::from_str(content)?)
    }

    /// The built-in six-zone station.
    pub fn demo() -> Result<Self, SimError> {
        Self::from_str(DEMO_LEVEL)
    }

    pub fn graph(&self) -> Result<ZoneGraph, SimError> {
        Ok(ZoneGraph::new(self.zones.clone())?)
    }

    /// Resolved pursuer start position.
    pub fn spawn(&self, graph: &ZoneGraph) -> Position {
        self.pursuer_spawn
            .or_else(|| graph.patrol_route().first().copied())
            .or_else(|| graph.center(lurk_events::ZoneId(0)))
            .unwrap_or_default()
    }
}
