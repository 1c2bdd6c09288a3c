//! Fatal engine errors.
//!
//! Illegal agent actions are not errors: the rules resolve them as
//! silent no-ops. The variants here indicate model corruption and abort
//! the match rather than letting it continue in an inconsistent state.

use std::fmt;

use crate::game::{Coordinates, PlayerId};

/// An invariant breach inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A coordinate outside the grid reached a cell lookup that must
    /// succeed.
    OutOfBounds {
        /// The offending coordinate.
        coord: Coordinates,
    },
    /// A scheduled player has no record in the grid.
    MissingPlayer {
        /// The player without a record.
        player: PlayerId,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { coord } => {
                write!(f, "out-of-bounds access at {coord:?}: grid state is corrupt")
            }
            Self::MissingPlayer { player } => {
                write!(f, "player {player} is scheduled but has no grid record")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
