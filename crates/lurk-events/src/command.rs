//! Movement commands sent to the navigation collaborator.
//!
//! Fire-and-forget: nothing flows back into the core through these. Progress
//! is observed on the next tick through the pursuer's senses.

use serde::{Deserialize, Serialize};

use crate::zone::Position;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MoveCommand {
    /// Path to a point
    MoveTo { target: Position },
    /// Halt and drop the current path
    Stop,
    /// Teleport-class repositioning (spawn/despawn)
    Warp { target: Position },
}

impl MoveCommand {
    pub fn move_to(target: Position) -> Self {
        MoveCommand::MoveTo { target }
    }

    pub fn warp(target: Position) -> Self {
        MoveCommand::Warp { target }
    }

    /// Destination of the command, if it has one.
    pub fn target(&self) -> Option<Position> {
        match self {
            MoveCommand::MoveTo { target } | MoveCommand::Warp { target } => Some(*target),
            MoveCommand::Stop => None,
        }
    }
}
