//! Headless scenario runner for the Overseer.
//!
//! Stands in for the game: a kinematic body plays the navigation
//! collaborator, a scripted player walks between zones and makes noise, and
//! simple sight and camera models turn that into stimuli. Every snapshot
//! interval the Overseer's state is appended to a JSONL file.

pub mod level;
pub mod output;
pub mod runner;
pub mod scenario;
pub mod world;

pub use level::Level;
pub use output::SnapshotWriter;
pub use runner::{RunConfig, RunSummary, Runner};
pub use scenario::{Scenario, ScriptedNoise, Visit};
pub use world::{Body, World};

use thiserror::Error;

/// Errors raised while loading or running a scenario.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] lurk_events::ZoneGraphError),

    #[error(transparent)]
    Config(#[from] overseer::ConfigError),

    #[error(transparent)]
    Overseer(#[from] overseer::OverseerError),

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error("invalid run settings: {0}")]
    Run(String),
}
