//! Multi-tick integration tests for the match engine.
//!
//! These drive full matches through the public API and check the
//! calibration scenarios end to end: digging, plate/door wiring,
//! chests, and fog reveals.
//!
//! Run with: cargo test --release game_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use delve::game::{
    Action, Cell, CellKind, Coordinates, Direction, Door, Game, GameMap, Grid, GridUpdate,
    PlayerInfo, WoodType,
};
use delve::runner::{GameRunner, StepOutcome};
use delve::strategy::{Strategy, StrategyRegistry, StrategySpec};
use delve::tournament::{run_match, MatchConfig};

/// Scripted strategy that also records every diff it receives.
struct Probe {
    actions: VecDeque<Action>,
    log: Rc<RefCell<ProbeLog>>,
}

#[derive(Default)]
struct ProbeLog {
    init_game: Option<Game>,
    updates: Vec<GridUpdate>,
}

impl Probe {
    fn new(actions: Vec<Action>) -> (Self, Rc<RefCell<ProbeLog>>) {
        let log = Rc::new(RefCell::new(ProbeLog::default()));
        (
            Self {
                actions: actions.into(),
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl Strategy for Probe {
    fn init(&mut self, game: Game) {
        self.log.borrow_mut().init_game = Some(game);
    }
    fn handle_grid_update(&mut self, update: GridUpdate) {
        self.log.borrow_mut().updates.push(update);
    }
    fn perform_action(&mut self) -> Action {
        self.actions.pop_front().unwrap_or_default()
    }
    fn debug(&self) -> String {
        String::new()
    }
}

/// A 7x7-unit style map: bedrock border around a stone shell with an
/// open interior, two players inside.
fn unit_map() -> GameMap {
    let mut grid = Grid::new(23, 23).unwrap();
    for (coord, _) in grid.clone().iter() {
        let edge = coord.row == 0 || coord.row == 22 || coord.col == 0 || coord.col == 22;
        let shell = coord.row % 7 == 1 || coord.col % 7 == 1;
        let cell = if edge {
            Cell::bedrock()
        } else if shell {
            Cell::stone()
        } else {
            Cell::empty()
        };
        grid.set(coord, cell);
    }
    // Carve starting room floors.
    for row in 2..8 {
        for col in 2..8 {
            grid.set(Coordinates::new(row, col), Cell::empty());
        }
    }
    grid.player_infos = vec![
        PlayerInfo::new(1, Coordinates::new(3, 3)),
        PlayerInfo::new(2, Coordinates::new(5, 5)),
    ];
    GameMap {
        players: vec![1, 2],
        length_units: 3,
        grid,
    }
}

fn runner_with(
    map: GameMap,
    ticks: u32,
    p1: Vec<Action>,
    p2: Vec<Action>,
) -> (GameRunner, Rc<RefCell<ProbeLog>>, Rc<RefCell<ProbeLog>>) {
    let game = Game::from_map(map, ticks, 20_000).unwrap();
    let (probe1, log1) = Probe::new(p1);
    let (probe2, log2) = Probe::new(p2);
    let runner = GameRunner::new(game, vec![Box::new(probe1), Box::new(probe2)]).unwrap();
    (runner, log1, log2)
}

#[test]
fn test_full_match_with_builtin_strategies() {
    let map = unit_map();
    let registry = StrategyRegistry::builtin();
    let specs = vec![
        StrategySpec::parse("explorer"),
        StrategySpec::parse("random"),
    ];
    let config = MatchConfig {
        game_length: 100,
        ..MatchConfig::default()
    };

    let result = run_match(9, &map, &specs, &registry, &config).unwrap();
    assert_eq!(result.ticks_played, 100);
    // Two mobile strategies in an open room always visit something.
    assert!(result.score > 0, "expected exploration, got {result:?}");
    assert!(result.faulted.is_empty());
}

#[test]
fn test_match_is_deterministic_end_to_end() {
    let map = unit_map();
    let registry = StrategyRegistry::builtin();
    let specs = vec![
        StrategySpec::parse("random"),
        StrategySpec::parse("random"),
    ];
    let config = MatchConfig {
        game_length: 60,
        ..MatchConfig::default()
    };

    for seed in [1_u64, 17, 99] {
        let a = run_match(seed, &map, &specs, &registry, &config).unwrap();
        let b = run_match(seed, &map, &specs, &registry, &config).unwrap();
        assert_eq!(a.score, b.score, "seed {seed} diverged");
        assert_eq!(a.visited_counts, b.visited_counts, "seed {seed} diverged");
    }
}

#[test]
fn test_scenario_basic_dig() {
    // A stone one hit from breaking: a single mine destroys it and
    // emits exactly one dirty coordinate.
    let mut map = unit_map();
    let target = Coordinates::new(3, 4);
    map.grid.set(
        target,
        Cell::new(CellKind::Stone {
            mine_count: 4,
            last_mined_tick: 0,
        }),
    );

    let (mut runner, log1, _log2) = runner_with(
        map,
        1,
        vec![Action::mine(Direction::Right)],
        vec![],
    );
    runner.step().unwrap(); // init
    runner.step().unwrap(); // player 1 mines

    assert_eq!(
        runner.game().grid.get(target).unwrap().kind,
        CellKind::Empty { door: None }
    );

    let log = log1.borrow();
    let update = log.updates.last().unwrap();
    assert_eq!(update.cell_updates.len(), 1);
    assert_eq!(update.cell_updates[0].coordinates, target);
    assert_eq!(update.cell_updates[0].cell.kind, CellKind::Empty { door: None });

    // Stone at mine_count 4 with life 5 resolves in one hit, as
    // configured by the map's default stone life.
    assert_eq!(runner.game().grid.stone_life, 5);
}

#[test]
fn test_scenario_plate_and_door() {
    let mut map = unit_map();
    let plate_at = Coordinates::new(3, 4);
    let door_at = Coordinates::new(5, 6);
    map.grid.set(plate_at, Cell::pressure_plate(WoodType::Acacia));
    map.grid.set(
        door_at,
        Cell::with_door(Door {
            direction: Direction::Right,
            wood_type: WoodType::Acacia,
            is_open: false,
            remaining_open_ticks: None,
        }),
    );

    let (mut runner, _log1, log2) = runner_with(
        map,
        2,
        vec![Action::step(Direction::Right), Action::step(Direction::Left)],
        vec![],
    );
    runner.step().unwrap(); // init

    // Player 1 steps onto the plate: the door flips open in the same
    // diff, for every observer whose fog already covers it.
    runner.step().unwrap();
    let door = runner.game().grid.get(door_at).unwrap().kind;
    assert!(door.door().unwrap().is_open);
    {
        let log = log2.borrow();
        let update = log.updates.last().unwrap();
        let door_update = update
            .cell_updates
            .iter()
            .find(|u| u.coordinates == door_at)
            .expect("door flip visible to player 2");
        assert!(door_update.cell.kind.door().unwrap().is_open);
    }

    runner.step().unwrap(); // player 2 idles, tick 1 ends

    // Player 1 steps off: counter back to zero, door closes.
    runner.step().unwrap();
    let door = runner.game().grid.get(door_at).unwrap().kind;
    assert!(!door.door().unwrap().is_open);
}

#[test]
fn test_scenario_chest() {
    let mut map = unit_map();
    let chest_at = Coordinates::new(3, 4);
    map.grid.set(chest_at, Cell::chest(30));

    let (mut runner, _log1, _log2) = runner_with(
        map,
        2,
        vec![
            Action::mine(Direction::Right),
            Action::step(Direction::Right),
        ],
        vec![],
    );
    runner.step().unwrap(); // init
    runner.step().unwrap(); // mine opens the chest

    assert_eq!(
        runner.game().grid.get(chest_at).unwrap().kind,
        CellKind::Chest {
            score: 30,
            is_opened: true
        }
    );
    assert_eq!(runner.game().score(), 30);

    runner.step().unwrap(); // player 2 idles
    runner.step().unwrap(); // player 1 walks onto the opened chest

    // 30 chest points plus the chest cell's own first visit.
    assert_eq!(runner.game().score(), 31);
    assert_eq!(
        runner.game().grid.player_info(1).unwrap().position,
        chest_at
    );
}

#[test]
fn test_scenario_fog_reveal_on_move() {
    let map = unit_map();
    // Player 1 at (3,3) is in unit (0,0): initial window is units
    // (0..=1, 0..=1), i.e. rows/cols 0..14.
    let (mut runner, log1, log2) = runner_with(
        map,
        3,
        vec![
            Action::step(Direction::Down), // (4,3)
            Action::step(Direction::Down), // (5,3)
            Action::step(Direction::Down), // (6,3) still unit 0
        ],
        vec![],
    );
    runner.step().unwrap(); // init

    {
        let log = log1.borrow();
        let init = log.init_game.as_ref().unwrap();
        assert_eq!(init.assigned_color, Some(1));
        // Inside the initial window the real terrain is visible.
        assert_ne!(
            init.grid.get(Coordinates::new(0, 0)).unwrap().kind,
            CellKind::Invisible
        );
        // Beyond it, fog.
        assert_eq!(
            init.grid.get(Coordinates::new(14, 3)).unwrap().kind,
            CellKind::Invisible
        );
    }

    // Walk down within the unit: no new rows revealed yet.
    runner.step().unwrap();
    runner.step().unwrap(); // p2 idles, tick 1 done
    runner.step().unwrap(); // p1 -> (5,3)
    runner.step().unwrap(); // p2 idles, tick 2 done

    let before: Vec<GridUpdate> = log1.borrow().updates.clone();
    for update in &before {
        for cell_update in &update.cell_updates {
            assert!(cell_update.coordinates.row < 14);
        }
    }

    // (6,3) is still unit row 0: the recompute changes nothing and
    // the view stays monotonic.
    runner.step().unwrap(); // p1 -> (6,3)
    let view = runner.view(1).unwrap();
    assert!(view.is_revealed(Coordinates::new(13, 13)));
    assert!(!view.is_revealed(Coordinates::new(14, 3)));

    // Player 2 started at (5,5), same unit: their fog never expanded
    // beyond their own window, and no diff leaked fogged coordinates.
    let log = log2.borrow();
    for update in &log.updates {
        for cell_update in &update.cell_updates {
            assert!(
                cell_update.coordinates.row < 14 && cell_update.coordinates.col < 14,
                "player 2 received fogged coordinate {:?}",
                cell_update.coordinates
            );
        }
    }
}

#[test]
fn test_fog_crossing_unit_boundary_expands_window() {
    // Open corridor map so player 1 can march straight down.
    let mut grid = Grid::new(23, 23).unwrap();
    grid.player_infos = vec![
        PlayerInfo::new(1, Coordinates::new(3, 3)),
        PlayerInfo::new(2, Coordinates::new(5, 5)),
    ];
    let map = GameMap {
        players: vec![1, 2],
        length_units: 3,
        grid,
    };

    let (mut runner, log1, _log2) = runner_with(
        map,
        4,
        vec![
            Action::step(Direction::Down), // (4,3)
            Action::step(Direction::Down), // (5,3)
            Action::step(Direction::Down), // (6,3)
            Action::step(Direction::Down), // (7,3): unit row 1
        ],
        vec![],
    );
    runner.step().unwrap(); // init

    for _ in 0..7 {
        runner.step().unwrap();
    }
    // Player 1 is on row 7, unit row 1: window now reaches row 21.
    let view = runner.view(1).unwrap();
    assert_eq!(
        runner.game().grid.player_info(1).unwrap().position,
        Coordinates::new(7, 3)
    );
    assert!(view.is_revealed(Coordinates::new(20, 3)));

    // The boundary-crossing diff carried the newly revealed band.
    let log = log1.borrow();
    let revealing = log
        .updates
        .iter()
        .any(|u| u.cell_updates.iter().any(|c| c.coordinates.row >= 14));
    assert!(revealing, "expected a diff containing rows >= 14");

    // Authoritative grid never contains fog placeholders.
    for (_, cell) in runner.game().grid.iter() {
        assert_ne!(cell.kind, CellKind::Invisible);
    }
}

#[test]
fn test_step_outcomes_drive_pacing() {
    let (mut runner, _log1, _log2) = runner_with(unit_map(), 2, vec![], vec![]);

    assert_eq!(runner.step().unwrap(), StepOutcome::TickInProgress); // init
    assert_eq!(runner.step().unwrap(), StepOutcome::TickInProgress);
    assert_eq!(runner.step().unwrap(), StepOutcome::TickCompleted);
    assert_eq!(runner.step().unwrap(), StepOutcome::TickInProgress);
    assert_eq!(runner.step().unwrap(), StepOutcome::TickCompleted);
    assert_eq!(runner.step().unwrap(), StepOutcome::Ended);
    assert_eq!(runner.step().unwrap(), StepOutcome::Ended);
}

#[test]
fn test_bundled_map_loads_and_runs() {
    let path = format!("{}/maps/heat_3x3.json", env!("CARGO_MANIFEST_DIR"));
    let map = GameMap::load(std::path::Path::new(&path)).unwrap();
    assert_eq!(map.players, vec![1, 2]);
    assert_eq!(map.grid.height(), 23);

    let registry = StrategyRegistry::builtin();
    let specs = vec![
        StrategySpec::parse("explorer"),
        StrategySpec::parse("random"),
    ];
    let config = MatchConfig {
        game_length: 50,
        ..MatchConfig::default()
    };
    let result = run_match(11, &map, &specs, &registry, &config).unwrap();
    assert_eq!(result.ticks_played, 50);
    assert!(result.score > 0);
}

#[test]
fn test_time_budgets_only_ever_decrease() {
    let map = unit_map();
    let registry = StrategyRegistry::builtin();
    let specs = vec![
        StrategySpec::parse("random"),
        StrategySpec::parse("explorer"),
    ];
    let config = MatchConfig {
        game_length: 30,
        ..MatchConfig::default()
    };

    let result = run_match(3, &map, &specs, &registry, &config).unwrap();
    for (player, remaining) in &result.remaining_time_ms {
        assert!(
            *remaining <= 20_000,
            "player {player} budget grew to {remaining}"
        );
    }
}
