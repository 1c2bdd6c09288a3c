//! Authoritative match state and scoring.

use serde::{Deserialize, Serialize};

use crate::game::{CellKind, Coordinates, GameMap, Grid, MapError, PlayerId, MAX_PLAYERS};

/// Complete match state.
///
/// Exactly one authoritative `Game` exists per match, owned by the
/// runner. Strategies only ever receive value copies with
/// `assigned_color` set and the grid projected through their fog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Participating players, fixed turn order within a tick.
    pub players: Vec<PlayerId>,
    /// The grid and per-player records.
    pub grid: Grid,
    /// Ticks completed or in progress. 0 before the first tick starts.
    pub current_tick: u32,
    /// Total tick budget for the match.
    pub game_length: u32,
    /// Identifies "you" in a per-player projection. Always `None` on
    /// the authoritative copy.
    #[serde(default)]
    pub assigned_color: Option<PlayerId>,
}

impl Game {
    /// Build the authoritative state from a generated map.
    ///
    /// Adds what the map does not carry: the tick counter and each
    /// player's time budget. Occupancy lists are rebuilt from the
    /// starting positions so the map blob cannot desynchronize them.
    ///
    /// # Errors
    ///
    /// Returns an error if the map fails validation.
    pub fn from_map(map: GameMap, game_length: u32, time_budget_ms: i64) -> Result<Self, MapError> {
        map.validate()?;
        let GameMap {
            players, mut grid, ..
        } = map;

        let positions: Vec<_> = grid
            .player_infos
            .iter()
            .map(|info| (info.player, info.position))
            .collect();
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                if let Some(cell) = grid.get_mut(Coordinates::new(row, col)) {
                    cell.occupants.clear();
                }
            }
        }
        for (player, position) in positions {
            if let Some(cell) = grid.get_mut(position) {
                cell.occupants.push(player);
            }
        }
        for info in &mut grid.player_infos {
            info.remaining_time_ms = time_budget_ms;
        }

        Ok(Self {
            players,
            grid,
            current_tick: 0,
            game_length,
            assigned_color: None,
        })
    }

    /// The current global score.
    ///
    /// One point per cell that has ever been visited, plus the reward of
    /// every opened chest. Recomputed on demand rather than cached, so
    /// it cannot drift from the grid.
    #[must_use]
    pub fn score(&self) -> u64 {
        let mut sum = 0_u64;
        for (_, cell) in self.grid.iter() {
            if cell.first_visit.is_some() {
                sum += 1;
            }
            if let CellKind::Chest {
                score,
                is_opened: true,
            } = cell.kind
            {
                sum += u64::from(score);
            }
        }
        sum
    }

    /// First-visit counts per player, indexed by `player_id - 1`.
    #[must_use]
    pub fn visited_counts(&self) -> [u32; MAX_PLAYERS] {
        let mut counts = [0_u32; MAX_PLAYERS];
        for (_, cell) in self.grid.iter() {
            if let Some(player) = cell.first_visit {
                let idx = usize::from(player).saturating_sub(1);
                if idx < MAX_PLAYERS {
                    counts[idx] += 1;
                }
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Grid, PlayerInfo};

    fn test_map() -> GameMap {
        let mut grid = Grid::new(8, 8).expect("non-zero dims");
        grid.player_infos = vec![
            PlayerInfo::new(1, Coordinates::new(1, 1)),
            PlayerInfo::new(2, Coordinates::new(6, 6)),
        ];
        GameMap {
            players: vec![1, 2],
            length_units: 1,
            grid,
        }
    }

    #[test]
    fn test_from_map_sets_budgets_and_occupancy() {
        let game = Game::from_map(test_map(), 100, 20_000).expect("valid map");

        assert_eq!(game.current_tick, 0);
        assert_eq!(game.game_length, 100);
        assert!(game.assigned_color.is_none());

        for info in &game.grid.player_infos {
            assert_eq!(info.remaining_time_ms, 20_000);
        }
        let cell = game.grid.get(Coordinates::new(1, 1)).expect("in bounds");
        assert_eq!(cell.occupants, vec![1]);
        let cell = game.grid.get(Coordinates::new(6, 6)).expect("in bounds");
        assert_eq!(cell.occupants, vec![2]);
    }

    #[test]
    fn test_from_map_rebuilds_stale_occupancy() {
        let mut map = test_map();
        // Map blob claims player 1 stands somewhere it does not.
        if let Some(cell) = map.grid.get_mut(Coordinates::new(3, 3)) {
            cell.occupants.push(1);
        }
        let game = Game::from_map(map, 100, 20_000).expect("valid map");
        let stale = game.grid.get(Coordinates::new(3, 3)).expect("in bounds");
        assert!(stale.occupants.is_empty());
    }

    #[test]
    fn test_score_counts_visits_and_open_chests() {
        let mut game = Game::from_map(test_map(), 100, 20_000).expect("valid map");

        assert_eq!(game.score(), 0);

        if let Some(cell) = game.grid.get_mut(Coordinates::new(2, 2)) {
            cell.first_visit = Some(1);
        }
        if let Some(cell) = game.grid.get_mut(Coordinates::new(3, 3)) {
            cell.first_visit = Some(2);
        }
        assert_eq!(game.score(), 2);

        // Unopened chest contributes nothing.
        game.grid.set(Coordinates::new(4, 4), Cell::chest(30));
        assert_eq!(game.score(), 2);

        if let Some(cell) = game.grid.get_mut(Coordinates::new(4, 4)) {
            cell.kind = CellKind::Chest {
                score: 30,
                is_opened: true,
            };
        }
        assert_eq!(game.score(), 32);

        let counts = game.visited_counts();
        assert_eq!(counts[0], 1);
        assert_eq!(counts[1], 1);
    }
}
