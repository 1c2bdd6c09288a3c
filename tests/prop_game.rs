//! Property-based tests for the match engine.
//!
//! These check the engine's core guarantees over randomized maps and
//! action scripts: determinism, fog monotonicity, first-visit
//! immutability, and movement legality.
//!
//! Run with: cargo test --release prop_game

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;

use proptest::prelude::*;

use delve::game::{
    Action, Cell, CellKind, Coordinates, Direction, Door, Game, GameMap, Grid, GridUpdate,
    PlayerInfo, WoodType,
};
use delve::runner::GameRunner;
use delve::strategy::Strategy;

const SIDE: u16 = 16;

/// Scripted strategy: fixed action list, then idle.
struct Scripted {
    actions: VecDeque<Action>,
}

impl Strategy for Scripted {
    fn init(&mut self, _game: Game) {}
    fn handle_grid_update(&mut self, _update: GridUpdate) {}
    fn perform_action(&mut self) -> Action {
        self.actions.pop_front().unwrap_or_default()
    }
    fn debug(&self) -> String {
        String::new()
    }
}

fn direction(code: u8) -> Direction {
    match code % 4 {
        0 => Direction::Up,
        1 => Direction::Down,
        2 => Direction::Left,
        _ => Direction::Right,
    }
}

fn wood(code: u8) -> WoodType {
    WoodType::ALL[usize::from(code) % WoodType::COUNT]
}

/// Decode a cell from a fuzz byte.
fn cell(code: u8) -> Cell {
    match code % 12 {
        0..=4 => Cell::empty(),
        5 | 6 => Cell::stone(),
        7 => Cell::bedrock(),
        8 => Cell::chest(u32::from(code)),
        9 => Cell::pressure_plate(wood(code / 12)),
        10 => Cell::with_door(Door {
            direction: direction(code / 12),
            wood_type: wood(code / 16),
            is_open: false,
            remaining_open_ticks: None,
        }),
        _ => Cell::empty(),
    }
}

/// Decode an action from a fuzz byte pair.
fn action(kind: u8, dir: u8) -> Action {
    match kind % 3 {
        0 => Action::step(direction(dir)),
        1 => Action::mine(direction(dir)),
        _ => Action::idle(),
    }
}

/// Build a fuzzed-but-valid two-player map.
fn build_map(cells: &[u8]) -> GameMap {
    let mut grid = Grid::new(SIDE, SIDE).unwrap();
    for (idx, code) in cells.iter().enumerate().take(usize::from(SIDE * SIDE)) {
        #[allow(clippy::cast_possible_truncation)]
        let coord = Coordinates::new(
            (idx / usize::from(SIDE)) as u16,
            (idx % usize::from(SIDE)) as u16,
        );
        grid.set(coord, cell(*code));
    }
    // Guarantee passable starts.
    let start1 = Coordinates::new(2, 2);
    let start2 = Coordinates::new(12, 12);
    grid.set(start1, Cell::empty());
    grid.set(start2, Cell::empty());
    grid.player_infos = vec![PlayerInfo::new(1, start1), PlayerInfo::new(2, start2)];
    GameMap {
        players: vec![1, 2],
        length_units: 2,
        grid,
    }
}

fn build_runner(map: GameMap, ticks: u32, script1: &[(u8, u8)], script2: &[(u8, u8)]) -> GameRunner {
    let game = Game::from_map(map, ticks, 20_000).unwrap();
    let to_strategy = |script: &[(u8, u8)]| -> Box<dyn Strategy> {
        Box::new(Scripted {
            actions: script.iter().map(|(k, d)| action(*k, *d)).collect(),
        })
    };
    GameRunner::new(game, vec![to_strategy(script1), to_strategy(script2)]).unwrap()
}

fn revealed_set(runner: &GameRunner, player: u8) -> Vec<bool> {
    let view = runner.view(player).unwrap();
    (0..SIDE)
        .flat_map(|row| (0..SIDE).map(move |col| Coordinates::new(row, col)))
        .map(|coord| view.is_revealed(coord))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Identical inputs produce byte-identical authoritative state.
    #[test]
    fn prop_match_deterministic(
        cells in prop::collection::vec(any::<u8>(), 256),
        script1 in prop::collection::vec((any::<u8>(), any::<u8>()), 12),
        script2 in prop::collection::vec((any::<u8>(), any::<u8>()), 12),
    ) {
        let run = || {
            let mut runner = build_runner(build_map(&cells), 6, &script1, &script2);
            runner.run_to_end().unwrap();
            (runner.game().clone(), runner.game().score())
        };
        let (game_a, score_a) = run();
        let (game_b, score_b) = run();
        prop_assert_eq!(game_a, game_b);
        prop_assert_eq!(score_a, score_b);
    }

    /// Fog never un-reveals; first visits never change; players never
    /// stand inside terrain; the authoritative grid never contains the
    /// fog placeholder.
    #[test]
    fn prop_engine_guarantees_hold_every_step(
        cells in prop::collection::vec(any::<u8>(), 256),
        script1 in prop::collection::vec((any::<u8>(), any::<u8>()), 12),
        script2 in prop::collection::vec((any::<u8>(), any::<u8>()), 12),
    ) {
        let mut runner = build_runner(build_map(&cells), 6, &script1, &script2);
        runner.step().unwrap(); // init

        let mut revealed1 = revealed_set(&runner, 1);
        let mut revealed2 = revealed_set(&runner, 2);
        let mut first_visits: Vec<Option<(Coordinates, u8)>> = Vec::new();

        loop {
            let outcome = runner.step().unwrap();
            if outcome.is_ended() {
                break;
            }
            let game = runner.game();

            // Visibility monotonicity, per player.
            for (player, revealed) in [(1, &mut revealed1), (2, &mut revealed2)] {
                let now = revealed_set(&runner, player);
                for (was, is) in revealed.iter().zip(&now) {
                    prop_assert!(!was || *is, "player {} lost visibility", player);
                }
                *revealed = now;
            }

            // First-visit immutability.
            for (idx, (coord, cell)) in game.grid.iter().enumerate() {
                if idx >= first_visits.len() {
                    first_visits.resize(idx + 1, None);
                }
                match (first_visits[idx], cell.first_visit) {
                    (Some((seen_coord, seen)), Some(current)) => {
                        prop_assert_eq!(seen_coord, coord);
                        prop_assert_eq!(seen, current, "first_visit changed at {:?}", coord);
                    }
                    (Some(_), None) => {
                        prop_assert!(false, "first_visit cleared at {:?}", coord);
                    }
                    (None, Some(current)) => {
                        first_visits[idx] = Some((coord, current));
                    }
                    (None, None) => {}
                }
            }

            // Movement legality and model sanity.
            for info in &game.grid.player_infos {
                let cell = game.grid.get(info.position).unwrap();
                prop_assert!(
                    cell.kind.is_passable(),
                    "player {} inside {:?}",
                    info.player,
                    cell.kind
                );
            }
            for (_, cell) in game.grid.iter() {
                prop_assert!(cell.kind != CellKind::Invisible);
                if let CellKind::Stone { mine_count, .. } = cell.kind {
                    prop_assert!(mine_count < game.grid.stone_life);
                }
            }
        }
    }

    /// Time budgets never grow.
    #[test]
    fn prop_budgets_never_increase(
        cells in prop::collection::vec(any::<u8>(), 256),
        script1 in prop::collection::vec((any::<u8>(), any::<u8>()), 8),
        script2 in prop::collection::vec((any::<u8>(), any::<u8>()), 8),
    ) {
        let mut runner = build_runner(build_map(&cells), 4, &script1, &script2);
        let mut budgets: Vec<i64> = vec![20_000, 20_000];

        loop {
            let outcome = runner.step().unwrap();
            for (idx, info) in runner.game().grid.player_infos.iter().enumerate() {
                prop_assert!(info.remaining_time_ms <= budgets[idx]);
                budgets[idx] = info.remaining_time_ms;
            }
            if outcome.is_ended() {
                break;
            }
        }
    }
}
