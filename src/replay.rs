//! Match recording and replay.
//!
//! Because matches are fully deterministic, a recording needs only the
//! map, the strategy lineup, and the match seed - no state deltas. To
//! view tick N, re-run the simulation from tick 0 to N.
//!
//! # Time travel
//!
//! - **Forward**: continue stepping the simulation
//! - **Backward**: re-run from tick 0 to (`current_tick` - 1)
//! - **Jump to tick N**: re-run from tick 0 to N

mod render;

pub use render::{render_ascii, render_player_view};

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::events::GameEvent;
use crate::game::{Game, GameMap, MapError, PlayerId};
use crate::runner::{GameRunner, RunnerError, StepOutcome, DEFAULT_TIME_BUDGET_MS};
use crate::strategy::{StrategyRegistry, StrategySpec, UnknownStrategy};
use crate::visibility::PlayerView;

/// Minimal recording: map, lineup, seed, and match parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Match seed; strategies derive their per-seat seeds from it.
    pub seed: u64,
    /// Tick budget for the match.
    pub game_length: u32,
    /// Per-player compute budget in milliseconds.
    #[serde(default = "default_time_budget")]
    pub time_budget_ms: i64,
    /// One spec per player, in the map's turn order.
    pub strategies: Vec<StrategySpec>,
    /// The full starting layout.
    pub map: GameMap,
}

const fn default_time_budget() -> i64 {
    DEFAULT_TIME_BUDGET_MS
}

impl Recording {
    /// Save the recording as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        let json = serde_json::to_vec_pretty(self).map_err(ReplayError::Decode)?;
        fs::write(path, json).map_err(ReplayError::Io)
    }

    /// Load a recording from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or decoding fails.
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let bytes = fs::read(path).map_err(ReplayError::Io)?;
        serde_json::from_slice(&bytes).map_err(ReplayError::Decode)
    }
}

/// Error type for replay operations.
#[derive(Debug)]
pub enum ReplayError {
    /// Recording file I/O failed.
    Io(std::io::Error),
    /// Recording JSON was invalid.
    Decode(serde_json::Error),
    /// The recorded map failed validation.
    Map(MapError),
    /// The recording names a strategy that is not registered.
    Strategy(UnknownStrategy),
    /// Lineup/seat mismatch when rebuilding the runner.
    Runner(RunnerError),
    /// The engine aborted on corrupt state.
    Engine(EngineError),
    /// Requested tick exceeds the recorded match length.
    TickOutOfBounds {
        /// Requested tick.
        requested: u32,
        /// Maximum tick (inclusive).
        max_tick: u32,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "recording I/O failed: {e}"),
            Self::Decode(e) => write!(f, "recording is not valid JSON: {e}"),
            Self::Map(e) => write!(f, "recorded map is invalid: {e}"),
            Self::Strategy(e) => write!(f, "{e}"),
            Self::Runner(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "engine aborted: {e}"),
            Self::TickOutOfBounds { requested, max_tick } => {
                write!(f, "tick {requested} out of bounds (max: {max_tick})")
            }
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<MapError> for ReplayError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}

impl From<UnknownStrategy> for ReplayError {
    fn from(e: UnknownStrategy) -> Self {
        Self::Strategy(e)
    }
}

impl From<RunnerError> for ReplayError {
    fn from(e: RunnerError) -> Self {
        Self::Runner(e)
    }
}

impl From<EngineError> for ReplayError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

/// Replay engine - steps through a recorded match deterministically.
pub struct ReplayEngine {
    recording: Recording,
    registry: StrategyRegistry,
    runner: GameRunner,
}

impl fmt::Debug for ReplayEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayEngine")
            .field("tick", &self.tick())
            .field("is_over", &self.is_over())
            .finish_non_exhaustive()
    }
}

impl ReplayEngine {
    /// Create a replay engine positioned before tick 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the map, lineup, or runner cannot be built.
    pub fn new(recording: Recording, registry: StrategyRegistry) -> Result<Self, ReplayError> {
        let game = Game::from_map(
            recording.map.clone(),
            recording.game_length,
            recording.time_budget_ms,
        )?;
        let lineup =
            registry.create_lineup(&recording.strategies, &game.players, recording.seed)?;
        let mut runner = GameRunner::new(game, lineup)?;
        // Deliver init so tick 1 is ready to step.
        runner.step()?;
        Ok(Self {
            recording,
            registry,
            runner,
        })
    }

    /// The recording being replayed.
    #[must_use]
    pub const fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Current tick number.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.runner.game().current_tick
    }

    /// The authoritative game at the current position.
    #[must_use]
    pub const fn state(&self) -> &Game {
        self.runner.game()
    }

    /// A player's fog-projected view at the current position.
    #[must_use]
    pub fn player_view(&self, player: PlayerId) -> Option<&PlayerView> {
        self.runner.view(player)
    }

    /// Events implied by the most recent step.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        self.runner.events()
    }

    /// Whether the recorded match has finished.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.runner.is_ended()
    }

    /// Invoke a strategy's `debug()` capability at the current
    /// position. Returns `None` for unknown or faulted seats.
    #[must_use]
    pub fn debug(&mut self, player: PlayerId) -> Option<String> {
        self.runner.debug(player)
    }

    /// Step forward one full tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the match is already over or the engine
    /// aborts.
    pub fn step_forward(&mut self) -> Result<(), ReplayError> {
        if self.is_over() {
            return Err(ReplayError::TickOutOfBounds {
                requested: self.tick() + 1,
                max_tick: self.recording.game_length,
            });
        }
        let outcome = self.runner.step_tick()?;
        debug_assert_ne!(outcome, StepOutcome::TickInProgress);
        Ok(())
    }

    /// Step backward one tick by re-running from tick 0.
    ///
    /// # Errors
    ///
    /// Returns an error if already at tick 0 or rebuilding fails.
    pub fn step_backward(&mut self) -> Result<(), ReplayError> {
        let current = self.tick();
        if current == 0 {
            return Err(ReplayError::TickOutOfBounds {
                requested: 0,
                max_tick: self.recording.game_length,
            });
        }
        self.goto_tick(current - 1)
    }

    /// Jump to a tick by re-running from tick 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick is out of bounds or rebuilding
    /// fails.
    pub fn goto_tick(&mut self, target_tick: u32) -> Result<(), ReplayError> {
        if target_tick > self.recording.game_length {
            return Err(ReplayError::TickOutOfBounds {
                requested: target_tick,
                max_tick: self.recording.game_length,
            });
        }
        let mut fresh = Self::new(self.recording.clone(), self.registry.clone())?;
        while fresh.tick() < target_tick && !fresh.is_over() {
            fresh.runner.step_tick()?;
        }
        *self = fresh;
        Ok(())
    }

    /// Render the authoritative state as colored ASCII.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        render_ascii(self.state())
    }
}
