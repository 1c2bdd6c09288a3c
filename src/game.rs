//! Game layer for Delve.
//!
//! Implements the world model and interaction rules:
//! - Grid of cells (bedrock, stone, floor, doors, plates, chests)
//! - Players with positions, time budgets, and broadcast signals
//! - Movement, mining, and the door/pressure-plate machinery
//! - The action/diff contract shared with strategies

mod grid;
mod invariants;
mod map;
mod player;
mod rules;
mod state;
mod update;

pub use grid::{
    Cell, CellKind, Coordinates, Direction, Door, Grid, WoodType, DEFAULT_STONE_LIFE,
};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use map::{GameMap, MapError};
pub use player::{PlayerId, PlayerInfo, MAX_PLAYERS};
pub use rules::{Effects, Rules};
pub use state::Game;
pub use update::{Action, ActionKind, CellUpdate, GridUpdate};
