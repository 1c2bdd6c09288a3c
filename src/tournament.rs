//! Batch match runner.
//!
//! Provides a pure function interface: `(seed, map, lineup) -> MatchResult`.
//! Because every piece of rule state is match-scoped, any number of
//! matches can run concurrently in one process; `run_series` fans out
//! over seeds with rayon.

use std::fmt;

use rayon::prelude::*;

use crate::error::EngineError;
use crate::game::{Game, GameMap, MapError, PlayerId, MAX_PLAYERS};
use crate::runner::{GameRunner, RunnerError, DEFAULT_TIME_BUDGET_MS};
use crate::strategy::{StrategyRegistry, StrategySpec, UnknownStrategy};

/// Configuration for a batch of matches.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Tick budget per match.
    pub game_length: u32,
    /// Per-player compute budget in milliseconds.
    pub time_budget_ms: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            game_length: 300,
            time_budget_ms: DEFAULT_TIME_BUDGET_MS,
        }
    }
}

/// Final result of one match.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The seed used for this match.
    pub seed: u64,
    /// Final global score (visits plus opened chests).
    pub score: u64,
    /// Ticks actually played.
    pub ticks_played: u32,
    /// First-visit counts per player, indexed by `player_id - 1`.
    pub visited_counts: [u32; MAX_PLAYERS],
    /// Remaining time budget per player, in seat order.
    pub remaining_time_ms: Vec<(PlayerId, i64)>,
    /// Players whose strategies faulted and forfeited.
    pub faulted: Vec<PlayerId>,
}

/// Error type for batch operations.
#[derive(Debug)]
pub enum TournamentError {
    /// The map failed validation.
    Map(MapError),
    /// The lineup does not cover the map's players.
    LineupMismatch {
        /// Players in the map.
        expected: usize,
        /// Specs supplied.
        found: usize,
    },
    /// A spec names an unregistered strategy.
    Strategy(UnknownStrategy),
    /// Runner setup failed.
    Runner(RunnerError),
    /// The engine aborted on corrupt state.
    Engine(EngineError),
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(e) => write!(f, "invalid map: {e}"),
            Self::LineupMismatch { expected, found } => {
                write!(f, "map has {expected} players but {found} strategies supplied")
            }
            Self::Strategy(e) => write!(f, "{e}"),
            Self::Runner(e) => write!(f, "{e}"),
            Self::Engine(e) => write!(f, "engine aborted: {e}"),
        }
    }
}

impl std::error::Error for TournamentError {}

impl From<MapError> for TournamentError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}

impl From<UnknownStrategy> for TournamentError {
    fn from(e: UnknownStrategy) -> Self {
        Self::Strategy(e)
    }
}

impl From<RunnerError> for TournamentError {
    fn from(e: RunnerError) -> Self {
        Self::Runner(e)
    }
}

impl From<EngineError> for TournamentError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

/// Run one complete match.
///
/// # Determinism
///
/// Given the same seed, map, and specs, this function always produces
/// the same `MatchResult`.
///
/// # Errors
///
/// Returns an error if the map, lineup, or engine fails.
pub fn run_match(
    seed: u64,
    map: &GameMap,
    specs: &[StrategySpec],
    registry: &StrategyRegistry,
    config: &MatchConfig,
) -> Result<MatchResult, TournamentError> {
    if specs.len() != map.players.len() {
        return Err(TournamentError::LineupMismatch {
            expected: map.players.len(),
            found: specs.len(),
        });
    }

    let game = Game::from_map(map.clone(), config.game_length, config.time_budget_ms)?;
    let lineup = registry.create_lineup(specs, &game.players, seed)?;
    let mut runner = GameRunner::new(game, lineup)?;
    runner.run_to_end()?;

    let game = runner.game();
    Ok(MatchResult {
        seed,
        score: game.score(),
        ticks_played: game.current_tick,
        visited_counts: game.visited_counts(),
        remaining_time_ms: game
            .grid
            .player_infos
            .iter()
            .map(|info| (info.player, info.remaining_time_ms))
            .collect(),
        faulted: runner.faulted_players(),
    })
}

/// Run `games` matches over consecutive seeds, in parallel.
///
/// Results are returned in seed order regardless of completion order.
///
/// # Errors
///
/// Returns the first per-match error, by seed order.
pub fn run_series(
    base_seed: u64,
    games: u64,
    map: &GameMap,
    specs: &[StrategySpec],
    registry: &StrategyRegistry,
    config: &MatchConfig,
) -> Result<Vec<MatchResult>, TournamentError> {
    (0..games)
        .into_par_iter()
        .map(|offset| run_match(base_seed.wrapping_add(offset), map, specs, registry, config))
        .collect()
}
