//! A greedy exploration strategy.

use std::fmt;

use crate::game::{Action, ActionKind, Game, GridUpdate};
use crate::strategy::{apply_update, candidate_actions, Strategy};

/// Prefers stepping onto never-visited cells, then mining, then
/// anything else. Deterministic: ties break on direction order.
pub struct ExplorerStrategy {
    state: Option<Game>,
}

impl fmt::Debug for ExplorerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorerStrategy")
            .field("initialized", &self.state.is_some())
            .finish()
    }
}

impl ExplorerStrategy {
    /// Create an explorer strategy.
    #[must_use]
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Preference weight for an action, higher is better.
    fn weight(game: &Game, action: Action) -> u32 {
        let Some(me) = game.assigned_color else {
            return 0;
        };
        let Some(info) = game.grid.player_info(me) else {
            return 0;
        };
        match action.kind {
            ActionKind::Move(direction) => {
                let target = info
                    .position
                    .step(direction, game.grid.height(), game.grid.width());
                let unvisited = target
                    .and_then(|coord| game.grid.get(coord))
                    .is_some_and(|cell| cell.first_visit.is_none());
                if unvisited { 20 } else { 5 }
            }
            ActionKind::Mine(_) => 10,
            ActionKind::Idle => 0,
        }
    }
}

impl Default for ExplorerStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for ExplorerStrategy {
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

        let mut best: Option<(u32, Action)> = None;
        for candidate in candidates {
            let weight = Self::weight(game, candidate);
            if best.is_none_or(|(best_weight, _)| weight > best_weight) {
                best = Some((weight, candidate));
            }
        }

        let Some((_, action)) = best else {
            return Action::idle();
        };
        match blocked_by {
            Some(wood_type) => action.with_signal(wood_type),
            None => action,
        }
    }

    fn debug(&self) -> String {
        match &self.state {
            Some(game) => {
                let visited: usize = game
                    .grid
                    .iter()
                    .filter(|(_, cell)| cell.first_visit.is_some())
                    .count();
                format!(
                    "explorer: tick {}/{}, {visited} cells visited",
                    game.current_tick, game.game_length
                )
            }
            None => "explorer: uninitialized".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Coordinates, Direction, Grid, PlayerInfo};

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
    fn test_prefers_unvisited_cells() {
        let mut game = local_game();
        // Mark every neighbor but (2, 3) as visited.
        for coord in [
            Coordinates::new(1, 2),
            Coordinates::new(3, 2),
            Coordinates::new(2, 1),
        ] {
            if let Some(cell) = game.grid.get_mut(coord) {
                cell.first_visit = Some(1);
            }
        }

        let mut strategy = ExplorerStrategy::new();
        strategy.init(game);
        assert_eq!(
            strategy.perform_action().kind,
            ActionKind::Move(Direction::Right)
        );
    }

    #[test]
    fn test_prefers_mining_over_visited_cells() {
        let mut game = local_game();
        for coord in [
            Coordinates::new(1, 2),
            Coordinates::new(3, 2),
            Coordinates::new(2, 1),
        ] {
            if let Some(cell) = game.grid.get_mut(coord) {
                cell.first_visit = Some(1);
            }
        }
        game.grid.set(Coordinates::new(2, 3), Cell::stone());

        let mut strategy = ExplorerStrategy::new();
        strategy.init(game);
        assert_eq!(
            strategy.perform_action().kind,
            ActionKind::Mine(Direction::Right)
        );
    }

    #[test]
    fn test_idle_when_boxed_in() {
        let mut game = local_game();
        for coord in [
            Coordinates::new(1, 2),
            Coordinates::new(3, 2),
            Coordinates::new(2, 1),
            Coordinates::new(2, 3),
        ] {
            game.grid.set(coord, Cell::bedrock());
        }

        let mut strategy = ExplorerStrategy::new();
        strategy.init(game);
        assert_eq!(strategy.perform_action().kind, ActionKind::Idle);
    }
}
