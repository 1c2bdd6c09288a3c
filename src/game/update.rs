//! Actions issued by strategies and the diffs sent back to them.

use serde::{Deserialize, Serialize};

use crate::game::{Cell, Coordinates, Direction, PlayerInfo, WoodType};

/// What a strategy wants to do with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Step one cell in a direction.
    Move(Direction),
    /// Swing at the adjacent cell in a direction.
    Mine(Direction),
    /// Do nothing this turn.
    Idle,
}

/// One turn's worth of intent from a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The action to take.
    pub kind: ActionKind,
    /// Optional broadcast hint attached to this turn.
    #[serde(default)]
    pub signal: Option<WoodType>,
}

impl Action {
    /// A turn spent moving in `direction`.
    #[must_use]
    pub const fn step(direction: Direction) -> Self {
        Self {
            kind: ActionKind::Move(direction),
            signal: None,
        }
    }

    /// A turn spent mining toward `direction`.
    #[must_use]
    pub const fn mine(direction: Direction) -> Self {
        Self {
            kind: ActionKind::Mine(direction),
            signal: None,
        }
    }

    /// A turn spent doing nothing.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            kind: ActionKind::Idle,
            signal: None,
        }
    }

    /// Attach a broadcast signal to this action.
    #[must_use]
    pub const fn with_signal(mut self, signal: WoodType) -> Self {
        self.signal = Some(signal);
        self
    }
}

impl Default for Action {
    fn default() -> Self {
        Self::idle()
    }
}

/// A single changed cell within a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    /// Where the change happened.
    pub coordinates: Coordinates,
    /// The cell's new contents, as visible to the receiving player.
    pub cell: Cell,
}

/// The incremental diff broadcast to every strategy after an action.
///
/// Cell updates are de-duplicated and sorted by coordinate; each
/// receiving player only sees coordinates already revealed to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridUpdate {
    /// Changed cells, projected through the receiver's fog.
    pub cell_updates: Vec<CellUpdate>,
    /// Changed player records (at most one per emission: the actor).
    pub player_info_updates: Vec<PlayerInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_constructors() {
        assert_eq!(Action::idle().kind, ActionKind::Idle);
        assert_eq!(
            Action::step(Direction::Left).kind,
            ActionKind::Move(Direction::Left)
        );
        assert_eq!(
            Action::mine(Direction::Up).kind,
            ActionKind::Mine(Direction::Up)
        );

        let signalled = Action::step(Direction::Up).with_signal(WoodType::Jungle);
        assert_eq!(signalled.signal, Some(WoodType::Jungle));
    }
}
