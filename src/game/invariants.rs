//! Engine invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented engine. If one
//! does, it indicates model corruption, not an illegal agent action
//! (illegal actions are resolved as no-ops long before this layer).

use crate::game::{CellKind, Game, Rules};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all engine invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(game: &Game, rules: &Rules) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let grid = &game.grid;

    let mut plate_occupancy = [0_u32; crate::game::WoodType::COUNT];

    for (coord, cell) in grid.iter() {
        match cell.kind {
            CellKind::Invisible => violations.push(InvariantViolation {
                message: format!("authoritative grid contains fog placeholder at {coord:?}"),
            }),
            CellKind::Stone { mine_count, .. } if mine_count >= grid.stone_life => {
                violations.push(InvariantViolation {
                    message: format!(
                        "stone at {coord:?} has {mine_count} hits but should have broken at {}",
                        grid.stone_life
                    ),
                });
            }
            CellKind::Empty {
                door: Some(door), ..
            } => {
                let active = rules.plate_count(door.wood_type) > 0;
                if door.is_open != active {
                    violations.push(InvariantViolation {
                        message: format!(
                            "door at {coord:?} is_open={} but {:?} plate count is {}",
                            door.is_open,
                            door.wood_type,
                            rules.plate_count(door.wood_type)
                        ),
                    });
                }
            }
            CellKind::PressurePlate { wood_type } => {
                #[allow(clippy::cast_possible_truncation)]
                let occupancy = cell.occupants.len() as u32;
                plate_occupancy[wood_type.index()] += occupancy;
            }
            _ => {}
        }

        for occupant in &cell.occupants {
            if !game.players.contains(occupant) {
                violations.push(InvariantViolation {
                    message: format!("cell {coord:?} lists non-participant {occupant}"),
                });
            }
            let position = grid.player_info(*occupant).map(|info| info.position);
            if position != Some(coord) {
                violations.push(InvariantViolation {
                    message: format!(
                        "cell {coord:?} lists player {occupant} whose position is {position:?}"
                    ),
                });
            }
        }

        if let Some(first) = cell.first_visit
            && !game.players.contains(&first)
        {
            violations.push(InvariantViolation {
                message: format!("cell {coord:?} was first visited by non-participant {first}"),
            });
        }
    }

    for wood_type in crate::game::WoodType::ALL {
        if rules.plate_count(wood_type) != plate_occupancy[wood_type.index()] {
            violations.push(InvariantViolation {
                message: format!(
                    "{wood_type:?} plate counter is {} but {} players stand on plates",
                    rules.plate_count(wood_type),
                    plate_occupancy[wood_type.index()]
                ),
            });
        }
    }

    for player in &game.players {
        let Some(info) = grid.player_info(*player) else {
            violations.push(InvariantViolation {
                message: format!("player {player} has no grid record"),
            });
            continue;
        };
        match grid.get(info.position) {
            None => violations.push(InvariantViolation {
                message: format!("player {player} stands out of bounds at {:?}", info.position),
            }),
            Some(cell) => {
                if !cell.kind.is_passable() {
                    violations.push(InvariantViolation {
                        message: format!(
                            "player {player} stands on impassable {:?} at {:?}",
                            cell.kind, info.position
                        ),
                    });
                }
                if !cell.occupants.contains(player) {
                    violations.push(InvariantViolation {
                        message: format!(
                            "player {player} at {:?} is missing from the cell's occupants",
                            info.position
                        ),
                    });
                }
            }
        }
    }

    violations
}

/// Assert all engine invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(game: &Game, rules: &Rules) {
    let violations = check_invariants(game, rules);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Engine invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_game: &Game, _rules: &Rules) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, Coordinates, Direction, Door, GameMap, Grid, PlayerInfo, WoodType};

    fn valid_game() -> (Game, Rules) {
        let mut grid = Grid::new(6, 6).expect("non-zero dims");
        grid.player_infos = vec![PlayerInfo::new(1, Coordinates::new(2, 2))];
        let map = GameMap {
            players: vec![1],
            length_units: 1,
            grid,
        };
        let mut game = Game::from_map(map, 10, 20_000).expect("valid map");
        let rules = Rules::new(&mut game);
        (game, rules)
    }

    #[test]
    fn test_valid_game_passes() {
        let (game, rules) = valid_game();
        assert!(check_invariants(&game, &rules).is_empty());
    }

    #[test]
    fn test_fog_in_authoritative_grid_detected() {
        let (mut game, rules) = valid_game();
        game.grid.set(Coordinates::new(0, 0), Cell::invisible());

        let violations = check_invariants(&game, &rules);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("fog"));
    }

    #[test]
    fn test_overmined_stone_detected() {
        let (mut game, rules) = valid_game();
        game.grid.set(
            Coordinates::new(0, 0),
            Cell::new(CellKind::Stone {
                mine_count: game.grid.stone_life,
                last_mined_tick: 0,
            }),
        );

        let violations = check_invariants(&game, &rules);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("stone"));
    }

    #[test]
    fn test_door_counter_mismatch_detected() {
        let (mut game, rules) = valid_game();
        let door = Door {
            direction: Direction::Up,
            wood_type: WoodType::Oak,
            is_open: true,
            remaining_open_ticks: None,
        };
        game.grid.set(Coordinates::new(0, 0), Cell::with_door(door));

        let violations = check_invariants(&game, &rules);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("door"));
    }

    #[test]
    fn test_stale_occupant_detected() {
        let (mut game, rules) = valid_game();
        if let Some(cell) = game.grid.get_mut(Coordinates::new(4, 4)) {
            cell.occupants.push(1);
        }

        let violations = check_invariants(&game, &rules);
        assert!(!violations.is_empty());
        assert!(violations[0].message.contains("position"));
    }

    #[test]
    fn test_missing_occupant_detected() {
        let (mut game, rules) = valid_game();
        if let Some(cell) = game.grid.get_mut(Coordinates::new(2, 2)) {
            cell.occupants.clear();
        }

        let violations = check_invariants(&game, &rules);
        assert!(!violations.is_empty());
        assert!(violations
            .iter()
            .any(|v| v.message.contains("missing from the cell's occupants")));
    }
}
