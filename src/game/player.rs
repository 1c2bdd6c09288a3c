//! Player identity and per-player match records.

use serde::{Deserialize, Serialize};

use crate::game::{Coordinates, WoodType};

/// Unique identifier for a player (1-8).
pub type PlayerId = u8;

/// Maximum number of players in a match.
pub const MAX_PLAYERS: usize = 8;

/// Per-player record tracked by the engine and mirrored into projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// Player identity.
    pub player: PlayerId,
    /// Current position. Always addresses a passable cell that lists
    /// this player among its occupants.
    pub position: Coordinates,
    /// Remaining compute-time budget in milliseconds. May go negative;
    /// depletion is observable but carries no penalty.
    #[serde(default)]
    pub remaining_time_ms: i64,
    /// Out-of-band hint last broadcast by this player's strategy,
    /// e.g. the wood type of a door blocking it.
    #[serde(default)]
    pub signal: Option<WoodType>,
}

impl PlayerInfo {
    /// Create a record for a player starting at `position`.
    #[must_use]
    pub const fn new(player: PlayerId, position: Coordinates) -> Self {
        Self {
            player,
            position,
            remaining_time_ms: 0,
            signal: None,
        }
    }
}
