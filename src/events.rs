//! Events implied by one step's diff.
//!
//! Presentation and audio collaborators derive their cues from these;
//! the engine itself attaches no meaning to them beyond emission.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{Coordinates, PlayerId, WoodType};

/// Something observable that happened while applying an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A player stepped from one cell to another.
    PlayerMoved {
        /// Who moved.
        player: PlayerId,
        /// Previous position.
        from: Coordinates,
        /// New position.
        to: Coordinates,
    },
    /// A door flipped open.
    DoorOpened {
        /// Door cell.
        at: Coordinates,
        /// Operating wood type.
        wood_type: WoodType,
    },
    /// A door flipped closed.
    DoorClosed {
        /// Door cell.
        at: Coordinates,
        /// Operating wood type.
        wood_type: WoodType,
    },
    /// A pressure plate went from unoccupied to occupied.
    PlateActivated {
        /// Plate cell.
        at: Coordinates,
        /// Plate wood type.
        wood_type: WoodType,
    },
    /// A pressure plate went from occupied to unoccupied.
    PlateDeactivated {
        /// Plate cell.
        at: Coordinates,
        /// Plate wood type.
        wood_type: WoodType,
    },
    /// A stone cell took a hit without breaking.
    StoneDamaged {
        /// Stone cell.
        at: Coordinates,
        /// Accumulated hits after this one.
        mine_count: u32,
    },
    /// A stone cell broke and became empty floor.
    StoneDestroyed {
        /// Former stone cell.
        at: Coordinates,
    },
    /// A stone cell's damage reset after a full unmined round.
    StoneDecayed {
        /// Stone cell.
        at: Coordinates,
    },
    /// A chest was opened.
    ChestOpened {
        /// Chest cell.
        at: Coordinates,
        /// Reward added to the match score.
        score: u32,
    },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerMoved { player, from, to } => {
                write!(
                    f,
                    "player {player} moved ({},{}) -> ({},{})",
                    from.row, from.col, to.row, to.col
                )
            }
            Self::DoorOpened { at, wood_type } => {
                write!(f, "{wood_type:?} door at ({},{}) opened", at.row, at.col)
            }
            Self::DoorClosed { at, wood_type } => {
                write!(f, "{wood_type:?} door at ({},{}) closed", at.row, at.col)
            }
            Self::PlateActivated { at, wood_type } => {
                write!(f, "{wood_type:?} plate at ({},{}) pressed", at.row, at.col)
            }
            Self::PlateDeactivated { at, wood_type } => {
                write!(f, "{wood_type:?} plate at ({},{}) released", at.row, at.col)
            }
            Self::StoneDamaged { at, mine_count } => {
                write!(f, "stone at ({},{}) damaged ({mine_count} hits)", at.row, at.col)
            }
            Self::StoneDestroyed { at } => {
                write!(f, "stone at ({},{}) destroyed", at.row, at.col)
            }
            Self::StoneDecayed { at } => {
                write!(f, "stone at ({},{}) recovered", at.row, at.col)
            }
            Self::ChestOpened { at, score } => {
                write!(f, "chest at ({},{}) opened for {score} points", at.row, at.col)
            }
        }
    }
}
