// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Delve: a deterministic grid-world match engine for programming games.
//!
//! This crate provides a turn-based simulation engine designed for:
//! - Bit-exact deterministic execution
//! - Per-player fog of war with incremental state synchronization
//! - Wall-clock time budgets and fault isolation for plugged-in
//!   strategies
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Tournament Runner           │
//! ├─────────────────────────────────────┤
//! │      Tick Scheduler (runner)        │
//! ├─────────────────────────────────────┤
//! │   Game Rules / Fog of War / Diffs   │
//! └─────────────────────────────────────┘
//! ```
//!
//! The authoritative [`game::Game`] is exclusively owned by the
//! [`runner::GameRunner`]; strategies only ever receive value copies
//! (a fog-projected game at `init`, then per-player diffs), never
//! references into authoritative state.

pub mod error;
pub mod events;
pub mod game;
pub mod replay;
pub mod runner;
pub mod strategy;
pub mod tournament;
pub mod visibility;

pub use error::{EngineError, EngineResult};
pub use events::GameEvent;

// Re-export key game types at crate root for convenience
pub use game::{
    Action, ActionKind, Cell, CellKind, Coordinates, Direction, Door, Game, GameMap, Grid,
    GridUpdate, PlayerId, PlayerInfo, WoodType,
};
pub use runner::{GameRunner, StepOutcome};
pub use strategy::{Strategy, StrategyRegistry, StrategySpec};
