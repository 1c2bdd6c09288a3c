//! A seeded random-walk strategy.

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::game::{Action, Game, GridUpdate};
use crate::strategy::{apply_update, candidate_actions, Strategy};

/// Picks uniformly among legal-looking moves and mines.
///
/// Seeded, so a given `(seed, match)` pair always replays identically.
pub struct RandomStrategy {
    state: Option<Game>,
    rng: ChaCha8Rng,
}

impl fmt::Debug for RandomStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomStrategy")
            .field("initialized", &self.state.is_some())
            .finish_non_exhaustive()
    }
}

impl RandomStrategy {
    /// Create a random strategy from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn init(&mut self, game: Game) {
        self.state = Some(game);
    }

    fn handle_grid_update(&mut self, update: GridUpdate) {
        if let Some(game) = &mut self.state {
            apply_update(game, &update);
        }
    }

    fn perform_action(&mut self) -> Action {
        let Some(game) = &self.state else {
            return Action::idle();
        };
        let (candidates, blocked_by) = candidate_actions(game);
        if candidates.is_empty() {
            return Action::idle();
        }
        let pick = candidates[self.rng.gen_range(0..candidates.len())];
        match blocked_by {
            Some(wood_type) => pick.with_signal(wood_type),
            None => pick,
        }
    }

    fn debug(&self) -> String {
        match &self.state {
            Some(game) => {
                let position = game
                    .assigned_color
                    .and_then(|me| game.grid.player_info(me))
                    .map(|info| info.position);
                format!(
                    "random: tick {}/{}, at {position:?}",
                    game.current_tick, game.game_length
                )
            }
            None => "random: uninitialized".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ActionKind, Coordinates, Grid, PlayerInfo};

    fn local_game() -> Game {
        let mut grid = Grid::new(5, 5).expect("non-zero dims");
        grid.player_infos = vec![PlayerInfo::new(1, Coordinates::new(2, 2))];
        Game {
            players: vec![1],
            grid,
            current_tick: 0,
            game_length: 10,
            assigned_color: Some(1),
        }
    }

    #[test]
    fn test_idle_before_init() {
        let mut strategy = RandomStrategy::new(1);
        assert_eq!(strategy.perform_action().kind, ActionKind::Idle);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = RandomStrategy::new(42);
        let mut b = RandomStrategy::new(42);
        a.init(local_game());
        b.init(local_game());

        for _ in 0..20 {
            assert_eq!(a.perform_action(), b.perform_action());
        }
    }

    #[test]
    fn test_only_legal_moves_are_chosen() {
        let mut strategy = RandomStrategy::new(7);
        strategy.init(local_game());

        for _ in 0..50 {
            let action = strategy.perform_action();
            // On an all-empty grid only moves are possible.
            assert!(matches!(action.kind, ActionKind::Move(_)));
        }
    }
}
