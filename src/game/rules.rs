//! Interaction rules: movement, mining, doors, and pressure plates.
//!
//! All state mutated here lives either in the authoritative [`Game`] or
//! in the match-scoped [`Rules`] value. Nothing is process-global, so
//! any number of matches can run concurrently in one process.

use std::collections::BTreeSet;

use crate::error::{EngineError, EngineResult};
use crate::events::GameEvent;
use crate::game::{ActionKind, CellKind, Coordinates, Direction, Game, PlayerId, WoodType};

/// Mutations accumulated while applying a single action.
#[derive(Debug, Clone, Default)]
pub struct Effects {
    /// Coordinates whose authoritative cell changed.
    pub dirty: BTreeSet<Coordinates>,
    /// Whether the actor ended on a new cell (triggers a fog recompute).
    pub moved: bool,
    /// Events implied by the mutations, in application order.
    pub events: Vec<GameEvent>,
}

impl Effects {
    /// Reset for the next action.
    pub fn clear(&mut self) {
        self.dirty.clear();
        self.moved = false;
        self.events.clear();
    }
}

/// Match-scoped rule state: the pressure-plate activation counters.
///
/// A door of wood type `w` is open iff `plate_count(w) > 0`. The
/// counters are seeded from starting occupancy and only ever change in
/// step with movement, so they can never go negative.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    plate_counts: [u32; WoodType::COUNT],
}

impl Rules {
    /// Create rule state for a match, seeding plate counters (and door
    /// states) from the players' starting positions.
    #[must_use]
    pub fn new(game: &mut Game) -> Self {
        let mut rules = Self {
            plate_counts: [0; WoodType::COUNT],
        };
        for (_, cell) in game.grid.iter() {
            if let CellKind::PressurePlate { wood_type } = cell.kind {
                #[allow(clippy::cast_possible_truncation)]
                let occupancy = cell.occupants.len() as u32;
                rules.plate_counts[wood_type.index()] += occupancy;
            }
        }
        let mut scratch = Effects::default();
        for wood_type in WoodType::ALL {
            let open = rules.plate_counts[wood_type.index()] > 0;
            rules.set_doors(game, wood_type, open, &mut scratch);
        }
        rules
    }

    /// Current activation count for a wood type.
    #[must_use]
    pub const fn plate_count(&self, wood_type: WoodType) -> u32 {
        self.plate_counts[wood_type.index()]
    }

    /// Apply one action for `player`, accumulating into `effects`.
    ///
    /// Illegal actions are silent no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error only on model corruption (a missing player
    /// record or an unreadable in-bounds cell).
    pub fn apply(
        &mut self,
        game: &mut Game,
        player: PlayerId,
        kind: ActionKind,
        effects: &mut Effects,
    ) -> EngineResult<()> {
        match kind {
            ActionKind::Move(direction) => self.apply_move(game, player, direction, effects),
            ActionKind::Mine(direction) => Self::apply_mine(game, player, direction, effects),
            ActionKind::Idle => Ok(()),
        }
    }

    /// Attempt to move `player` one cell in `direction`.
    pub fn apply_move(
        &mut self,
        game: &mut Game,
        player: PlayerId,
        direction: Direction,
        effects: &mut Effects,
    ) -> EngineResult<()> {
        let from = game
            .grid
            .player_info(player)
            .ok_or(EngineError::MissingPlayer { player })?
            .position;
        let from_cell = game
            .grid
            .get(from)
            .ok_or(EngineError::OutOfBounds { coord: from })?;

        // A closed door blocks leaving its cell through the blocked side.
        if let Some(door) = from_cell.kind.door()
            && !door.is_open
            && door.direction == direction
        {
            return Ok(());
        }

        let Some(to) = from.step(direction, game.grid.height(), game.grid.width()) else {
            return Ok(());
        };
        let to_cell = game
            .grid
            .get(to)
            .ok_or(EngineError::OutOfBounds { coord: to })?;
        if !to_cell.kind.is_passable() {
            return Ok(());
        }

        if let CellKind::PressurePlate { wood_type } = from_cell.kind {
            self.deactivate_plate(game, from, wood_type, effects);
        }

        if let Some(cell) = game.grid.get_mut(from) {
            cell.occupants.retain(|p| *p != player);
        }
        effects.dirty.insert(from);

        {
            let cell = game
                .grid
                .get_mut(to)
                .ok_or(EngineError::OutOfBounds { coord: to })?;
            cell.occupants.push(player);
            if cell.first_visit.is_none() {
                cell.first_visit = Some(player);
                cell.is_visited = true;
            }
        }
        effects.dirty.insert(to);

        game.grid
            .player_info_mut(player)
            .ok_or(EngineError::MissingPlayer { player })?
            .position = to;
        effects.moved = true;
        effects.events.push(GameEvent::PlayerMoved { player, from, to });

        if let Some(CellKind::PressurePlate { wood_type }) = game.grid.get(to).map(|c| c.kind) {
            self.activate_plate(game, to, wood_type, effects);
        }

        Ok(())
    }

    /// Attempt to mine the cell adjacent to `player` in `direction`.
    pub fn apply_mine(
        game: &mut Game,
        player: PlayerId,
        direction: Direction,
        effects: &mut Effects,
    ) -> EngineResult<()> {
        let from = game
            .grid
            .player_info(player)
            .ok_or(EngineError::MissingPlayer { player })?
            .position;
        let Some(target) = from.step(direction, game.grid.height(), game.grid.width()) else {
            return Ok(());
        };
        let stone_life = game.grid.stone_life;
        let current_tick = game.current_tick;
        let cell = game
            .grid
            .get_mut(target)
            .ok_or(EngineError::OutOfBounds { coord: target })?;

        match cell.kind {
            CellKind::Chest {
                score,
                is_opened: false,
            } => {
                cell.kind = CellKind::Chest {
                    score,
                    is_opened: true,
                };
                effects.dirty.insert(target);
                effects.events.push(GameEvent::ChestOpened { at: target, score });
            }
            CellKind::Stone { mine_count, .. } => {
                let mine_count = mine_count + 1;
                if mine_count >= stone_life {
                    cell.kind = CellKind::Empty { door: None };
                    effects.events.push(GameEvent::StoneDestroyed { at: target });
                } else {
                    cell.kind = CellKind::Stone {
                        mine_count,
                        last_mined_tick: current_tick,
                    };
                    effects.events.push(GameEvent::StoneDamaged {
                        at: target,
                        mine_count,
                    });
                }
                effects.dirty.insert(target);
            }
            _ => {}
        }

        Ok(())
    }

    /// End-of-tick stone decay: any stone with damage not refreshed
    /// during the tick that just completed resets to zero.
    pub fn decay_stones(game: &mut Game, effects: &mut Effects) {
        let tick = game.current_tick;
        let stale: Vec<Coordinates> = game
            .grid
            .iter()
            .filter_map(|(coord, cell)| match cell.kind {
                CellKind::Stone {
                    mine_count,
                    last_mined_tick,
                } if mine_count > 0 && last_mined_tick != tick => Some(coord),
                _ => None,
            })
            .collect();

        for coord in stale {
            if let Some(cell) = game.grid.get_mut(coord)
                && let CellKind::Stone {
                    last_mined_tick, ..
                } = cell.kind
            {
                cell.kind = CellKind::Stone {
                    mine_count: 0,
                    last_mined_tick,
                };
                effects.dirty.insert(coord);
                effects.events.push(GameEvent::StoneDecayed { at: coord });
            }
        }
    }

    /// One more player stands on a plate of `wood_type`.
    fn activate_plate(
        &mut self,
        game: &mut Game,
        at: Coordinates,
        wood_type: WoodType,
        effects: &mut Effects,
    ) {
        let count = &mut self.plate_counts[wood_type.index()];
        *count += 1;
        if *count == 1 {
            effects.events.push(GameEvent::PlateActivated { at, wood_type });
            self.set_doors(game, wood_type, true, effects);
        }
    }

    /// One fewer player stands on a plate of `wood_type`.
    fn deactivate_plate(
        &mut self,
        game: &mut Game,
        at: Coordinates,
        wood_type: WoodType,
        effects: &mut Effects,
    ) {
        let count = &mut self.plate_counts[wood_type.index()];
        *count = count.saturating_sub(1);
        if *count == 0 {
            effects
                .events
                .push(GameEvent::PlateDeactivated { at, wood_type });
            self.set_doors(game, wood_type, false, effects);
        }
    }

    /// Flip every door of `wood_type` to `open`, marking flipped doors
    /// dirty.
    fn set_doors(&self, game: &mut Game, wood_type: WoodType, open: bool, effects: &mut Effects) {
        for coord in game.grid.doors_of(wood_type) {
            if let Some(cell) = game.grid.get_mut(coord)
                && let CellKind::Empty { door: Some(door) } = &mut cell.kind
                && door.is_open != open
            {
                door.is_open = open;
                effects.dirty.insert(coord);
                effects.events.push(if open {
                    GameEvent::DoorOpened { at: coord, wood_type }
                } else {
                    GameEvent::DoorClosed { at: coord, wood_type }
                });
            }
        }
    }
}
