//! Benchmarks for running complete matches.
//!
//! This benchmarks the full step loop - scheduling, rules, fog
//! projection, and diff delivery - which is the hot path.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use delve::game::{Cell, Coordinates, GameMap, Grid, PlayerInfo};
use delve::strategy::{StrategyRegistry, StrategySpec};
use delve::tournament::{run_match, MatchConfig};

/// Build a 3x3-unit map with stone shells and open rooms.
fn bench_map() -> GameMap {
    let mut grid = Grid::new(23, 23).expect("non-zero dims");
    for row in 0..23_u16 {
        for col in 0..23_u16 {
            let coord = Coordinates::new(row, col);
            let edge = row == 0 || row == 22 || col == 0 || col == 22;
            let shell = row % 7 == 1 || col % 7 == 1;
            let cell = if edge {
                Cell::bedrock()
            } else if shell {
                Cell::stone()
            } else {
                Cell::empty()
            };
            grid.set(coord, cell);
        }
    }
    for row in 2..8 {
        for col in 2..8 {
            grid.set(Coordinates::new(row, col), Cell::empty());
        }
    }
    grid.set(Coordinates::new(16, 16), Cell::chest(40));
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

fn bench_single_match(c: &mut Criterion) {
    let map = bench_map();
    let registry = StrategyRegistry::builtin();
    let specs = vec![
        StrategySpec::parse("random"),
        StrategySpec::parse("explorer"),
    ];
    let config = MatchConfig {
        game_length: 200,
        ..MatchConfig::default()
    };

    c.bench_function("single_match_2p_200t", |b| {
        b.iter(|| {
            let result = run_match(
                black_box(42),
                black_box(&map),
                black_box(&specs),
                &registry,
                &config,
            );
            black_box(result)
        });
    });
}

fn bench_short_match(c: &mut Criterion) {
    let map = bench_map();
    let registry = StrategyRegistry::builtin();
    let specs = vec![
        StrategySpec::parse("random"),
        StrategySpec::parse("random"),
    ];
    let config = MatchConfig {
        game_length: 20,
        ..MatchConfig::default()
    };

    c.bench_function("single_match_2p_20t", |b| {
        b.iter(|| {
            let result = run_match(
                black_box(7),
                black_box(&map),
                black_box(&specs),
                &registry,
                &config,
            );
            black_box(result)
        });
    });
}

criterion_group!(benches, bench_single_match, bench_short_match);
criterion_main!(benches);
