//! The tick scheduler: lifecycle state machine and agent boundary.
//!
//! Owns the only authoritative [`Game`] for the match. One `step()`
//! call services exactly one player's action (after a one-off
//! initialization step); a tick completes when every player has acted
//! once. Pacing is the caller's job - the runner never sleeps, it only
//! measures elapsed wall-clock time per agent call.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::error::{EngineError, EngineResult};
use crate::events::GameEvent;
use crate::game::{
    assert_invariants, CellUpdate, Coordinates, Effects, Game, GridUpdate, PlayerId,
    PlayerInfo, Rules,
};
use crate::strategy::Strategy;
use crate::visibility::PlayerView;

/// Default per-player compute budget, in milliseconds.
pub const DEFAULT_TIME_BUDGET_MS: i64 = 20_000;

/// What one `step()` call accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An action was processed; the current tick is not finished.
    TickInProgress,
    /// The last player of the tick acted; the tick is complete.
    TickCompleted,
    /// The match is over; the call was a no-op.
    Ended,
}

impl StepOutcome {
    /// Whether the match has ended.
    #[must_use]
    pub const fn is_ended(self) -> bool {
        matches!(self, Self::Ended)
    }
}

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Running,
    Ended,
}

/// Error type for runner setup.
#[derive(Debug, Clone, Copy)]
pub enum RunnerError {
    /// The number of strategies does not match the player list.
    StrategyCountMismatch {
        /// Players in the game.
        expected: usize,
        /// Strategies supplied.
        found: usize,
    },
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrategyCountMismatch { expected, found } => {
                write!(f, "{expected} players but {found} strategies supplied")
            }
        }
    }
}

impl std::error::Error for RunnerError {}

/// One player's seat: their strategy, their private view, and their
/// fault state.
struct Seat {
    player: PlayerId,
    strategy: Box<dyn Strategy>,
    view: PlayerView,
    faulted: bool,
    budget_warned: bool,
}

impl fmt::Debug for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seat")
            .field("player", &self.player)
            .field("faulted", &self.faulted)
            .finish_non_exhaustive()
    }
}

/// Invoke one timed, fault-isolated contract call on a seat.
///
/// Elapsed wall-clock time is billed against the player's budget
/// (monotonic clock, so never negative). A panic marks the seat
/// faulted; the caller sees `None`.
fn timed_call<T>(
    seat: &mut Seat,
    infos: &mut [PlayerInfo],
    f: impl FnOnce(&mut dyn Strategy) -> T,
) -> Option<T> {
    if seat.faulted {
        return None;
    }
    let start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| f(seat.strategy.as_mut())));
    let elapsed = i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX);

    if let Some(info) = infos.iter_mut().find(|info| info.player == seat.player) {
        info.remaining_time_ms = info.remaining_time_ms.saturating_sub(elapsed);
        if info.remaining_time_ms < 0 && !seat.budget_warned {
            seat.budget_warned = true;
            tracing::warn!(
                player = seat.player,
                "time budget exhausted; play continues unpunished"
            );
        }
    }

    match result {
        Ok(value) => Some(value),
        Err(_) => {
            seat.faulted = true;
            tracing::warn!(
                player = seat.player,
                "strategy panicked; seat forfeits its remaining actions"
            );
            None
        }
    }
}

/// The authoritative match driver.
pub struct GameRunner {
    game: Game,
    rules: Rules,
    seats: Vec<Seat>,
    phase: Phase,
    tick_sequence: VecDeque<PlayerId>,
    effects: Effects,
    last_events: Vec<GameEvent>,
}

impl fmt::Debug for GameRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameRunner")
            .field("phase", &self.phase)
            .field("current_tick", &self.game.current_tick)
            .field("game_length", &self.game.game_length)
            .finish_non_exhaustive()
    }
}

impl GameRunner {
    /// Create a runner from an authoritative game and one strategy per
    /// player, in the game's turn order.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy count does not match the player
    /// list.
    pub fn new(
        mut game: Game,
        strategies: Vec<Box<dyn Strategy>>,
    ) -> Result<Self, RunnerError> {
        if strategies.len() != game.players.len() {
            return Err(RunnerError::StrategyCountMismatch {
                expected: game.players.len(),
                found: strategies.len(),
            });
        }
        let rules = Rules::new(&mut game);
        let seats = game
            .players
            .iter()
            .copied()
            .zip(strategies)
            .map(|(player, strategy)| Seat {
                player,
                strategy,
                view: PlayerView::new(player, &game.grid),
                faulted: false,
                budget_warned: false,
            })
            .collect();
        Ok(Self {
            game,
            rules,
            seats,
            phase: Phase::Uninitialized,
            tick_sequence: VecDeque::new(),
            effects: Effects::default(),
            last_events: Vec::new(),
        })
    }

    /// The authoritative game, for rendering and statistics.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Events implied by the most recent `step()` diff.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.last_events
    }

    /// A player's private fog-projected view.
    #[must_use]
    pub fn view(&self, player: PlayerId) -> Option<&PlayerView> {
        self.seats
            .iter()
            .find(|seat| seat.player == player)
            .map(|seat| &seat.view)
    }

    /// Players whose strategies have faulted and forfeited.
    #[must_use]
    pub fn faulted_players(&self) -> Vec<PlayerId> {
        self.seats
            .iter()
            .filter(|seat| seat.faulted)
            .map(|seat| seat.player)
            .collect()
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
            || (self.tick_sequence.is_empty()
                && self.game.current_tick >= self.game.game_length
                && self.phase != Phase::Uninitialized)
    }

    /// Service one action (or the one-off initialization).
    ///
    /// Returns whether the tick just completed; callers drive their
    /// pacing loop off that. After the match ends this is a no-op
    /// returning [`StepOutcome::Ended`].
    ///
    /// # Errors
    ///
    /// Returns an error on model corruption; the match must then be
    /// abandoned.
    pub fn step(&mut self) -> EngineResult<StepOutcome> {
        match self.phase {
            Phase::Uninitialized => {
                self.initialize();
                self.phase = Phase::Running;
                return Ok(StepOutcome::TickInProgress);
            }
            Phase::Ended => return Ok(StepOutcome::Ended),
            Phase::Running => {}
        }

        if self.tick_sequence.is_empty() {
            if self.game.current_tick >= self.game.game_length {
                self.phase = Phase::Ended;
                return Ok(StepOutcome::Ended);
            }
            self.game.current_tick += 1;
            self.tick_sequence.extend(self.game.players.iter().copied());
        }

        let Some(player) = self.tick_sequence.pop_front() else {
            return Ok(StepOutcome::TickCompleted);
        };

        self.effects.clear();
        let action = self
            .seat_call(player, |strategy| strategy.perform_action())
            .unwrap_or_default();
        tracing::debug!(tick = self.game.current_tick, player, ?action, "applying action");

        self.rules
            .apply(&mut self.game, player, action.kind, &mut self.effects)?;
        if let Some(info) = self.game.grid.player_info_mut(player) {
            info.signal = action.signal;
        }

        let tick_completed = self.tick_sequence.is_empty();
        if tick_completed {
            Rules::decay_stones(&mut self.game, &mut self.effects);
        }

        self.deliver_updates(player)?;
        self.last_events = std::mem::take(&mut self.effects.events);
        assert_invariants(&self.game, &self.rules);

        Ok(if tick_completed {
            StepOutcome::TickCompleted
        } else {
            StepOutcome::TickInProgress
        })
    }

    /// Step until the current tick completes (or the match ends).
    ///
    /// # Errors
    ///
    /// Propagates the first `step()` error.
    pub fn step_tick(&mut self) -> EngineResult<StepOutcome> {
        loop {
            let outcome = self.step()?;
            if outcome != StepOutcome::TickInProgress {
                return Ok(outcome);
            }
        }
    }

    /// Run the remainder of the match to completion.
    ///
    /// # Errors
    ///
    /// Propagates the first `step()` error.
    pub fn run_to_end(&mut self) -> EngineResult<()> {
        while !self.step()?.is_ended() {}
        Ok(())
    }

    /// Invoke a seat's `debug()` capability. Panics inside `debug()`
    /// are caught and discarded; the seat keeps playing.
    #[must_use]
    pub fn debug(&mut self, player: PlayerId) -> Option<String> {
        let seat = self
            .seats
            .iter_mut()
            .find(|seat| seat.player == player)?;
        if seat.faulted {
            return None;
        }
        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| seat.strategy.debug())).ok();
        let elapsed = i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX);
        if let Some(info) = self.game.grid.player_info_mut(player) {
            info.remaining_time_ms = info.remaining_time_ms.saturating_sub(elapsed);
        }
        result
    }

    /// Build every seat's initial projection and deliver `init`.
    fn initialize(&mut self) {
        for seat in &mut self.seats {
            if let Some(info) = self.game.grid.player_info(seat.player) {
                seat.view.reveal_window(info.position, &self.game.grid);
            }
        }
        for seat in &mut self.seats {
            let projected = seat.view.projected_game(&self.game);
            timed_call(seat, &mut self.game.grid.player_infos, |strategy| {
                strategy.init(projected);
            });
        }
        tracing::debug!(players = self.seats.len(), "match initialized");
    }

    /// Timed, fault-isolated call on the seat of `player`.
    fn seat_call<T>(
        &mut self,
        player: PlayerId,
        f: impl FnOnce(&mut dyn Strategy) -> T,
    ) -> Option<T> {
        let seat = self.seats.iter_mut().find(|seat| seat.player == player)?;
        timed_call(seat, &mut self.game.grid.player_infos, f)
    }

    /// Project the step's dirty set into each seat's view and deliver
    /// the per-player diffs, including to the actor.
    fn deliver_updates(&mut self, actor: PlayerId) -> EngineResult<()> {
        let actor_info = self
            .game
            .grid
            .player_info(actor)
            .copied()
            .ok_or(EngineError::MissingPlayer { player: actor })?;
        let dirty: Vec<Coordinates> = self.effects.dirty.iter().copied().collect();
        let moved = self.effects.moved;

        for seat in &mut self.seats {
            // Movement may have revealed new terrain for the actor.
            let mut coords: BTreeSet<Coordinates> = dirty
                .iter()
                .copied()
                .filter(|coord| seat.view.is_revealed(*coord))
                .collect();
            if seat.player == actor && moved {
                coords.extend(
                    seat.view
                        .reveal_window(actor_info.position, &self.game.grid),
                );
            }

            let mut cell_updates = Vec::with_capacity(coords.len());
            for coord in coords {
                seat.view.sync_cell(coord, &self.game.grid);
                if let Some(cell) = self.game.grid.get(coord) {
                    cell_updates.push(CellUpdate {
                        coordinates: coord,
                        cell: cell.clone(),
                    });
                }
            }
            seat.view.sync_player_info(&actor_info);

            let update = GridUpdate {
                cell_updates,
                player_info_updates: vec![actor_info],
            };
            timed_call(seat, &mut self.game.grid.player_infos, |strategy| {
                strategy.handle_grid_update(update);
            });
        }
        Ok(())
    }
}
