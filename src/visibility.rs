//! Unit-granular fog of war and per-player projections.
//!
//! The grid is tiled into fixed-size square units. A player sees the
//! 3x3 block of units centered on the unit containing their position,
//! clipped to the grid. Revealing is monotonic: once a cell is revealed
//! to a player it never fogs over again in that player's projection.
//!
//! The authoritative grid never contains [`CellKind::Invisible`]; it is
//! purely a projection artifact owned by this module.

use crate::game::{Cell, CellKind, Coordinates, Game, Grid, PlayerId, PlayerInfo};

/// Edge length of a visibility unit, in cells.
pub const UNIT_LENGTH: u16 = 7;

/// A single player's private, fog-projected copy of the grid.
///
/// Views are value copies synchronized through explicit diffs; they
/// hold no reference into authoritative state.
#[derive(Debug, Clone)]
pub struct PlayerView {
    player: PlayerId,
    view: Grid,
    revealed: Vec<bool>,
}

impl PlayerView {
    /// Create a fully fogged view for `player`.
    ///
    /// Player records are copied in full: positions and budgets are
    /// global knowledge, only terrain is fogged.
    #[must_use]
    pub fn new(player: PlayerId, grid: &Grid) -> Self {
        let mut view = Grid::new_fogged(grid.height(), grid.width())
            .unwrap_or_else(|| grid.clone());
        view.stone_life = grid.stone_life;
        view.player_infos = grid.player_infos.clone();
        let size = usize::from(grid.height()) * usize::from(grid.width());
        Self {
            player,
            view,
            revealed: vec![false; size],
        }
    }

    /// The player this view belongs to.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// The projected grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.view
    }

    /// Whether a coordinate has been revealed to this player.
    #[must_use]
    pub fn is_revealed(&self, coord: Coordinates) -> bool {
        self.index(coord).is_some_and(|idx| self.revealed[idx])
    }

    fn index(&self, coord: Coordinates) -> Option<usize> {
        self.view.in_bounds(coord).then(|| {
            usize::from(coord.row) * usize::from(self.view.width()) + usize::from(coord.col)
        })
    }

    /// Reveal the 3x3-unit window around `center`, copying authoritative
    /// cells into the projection.
    ///
    /// Returns the coordinates revealed for the first time, in row-major
    /// order. Already revealed cells are left untouched (they are synced
    /// through diffs, not through visibility).
    pub fn reveal_window(&mut self, center: Coordinates, grid: &Grid) -> Vec<Coordinates> {
        let unit_row = center.row / UNIT_LENGTH;
        let unit_col = center.col / UNIT_LENGTH;

        let row_start = unit_row.saturating_sub(1) * UNIT_LENGTH;
        let col_start = unit_col.saturating_sub(1) * UNIT_LENGTH;
        let row_end = ((unit_row + 2) * UNIT_LENGTH).min(grid.height());
        let col_end = ((unit_col + 2) * UNIT_LENGTH).min(grid.width());

        let mut newly_revealed = Vec::new();
        for row in row_start..row_end {
            for col in col_start..col_end {
                let coord = Coordinates::new(row, col);
                let Some(idx) = self.index(coord) else {
                    continue;
                };
                if self.revealed[idx] {
                    continue;
                }
                if let Some(cell) = grid.get(coord) {
                    self.revealed[idx] = true;
                    self.view.set(coord, cell.clone());
                    newly_revealed.push(coord);
                }
            }
        }
        newly_revealed
    }

    /// Copy the authoritative cell at `coord` into the projection, but
    /// only if the coordinate is already revealed to this player.
    ///
    /// Returns `true` if the projection changed.
    pub fn sync_cell(&mut self, coord: Coordinates, grid: &Grid) -> bool {
        if !self.is_revealed(coord) {
            return false;
        }
        if let Some(cell) = grid.get(coord) {
            self.view.set(coord, cell.clone());
            true
        } else {
            false
        }
    }

    /// Replace this view's copy of a player record.
    pub fn sync_player_info(&mut self, info: &PlayerInfo) {
        if let Some(record) = self.view.player_info_mut(info.player) {
            *record = *info;
        }
    }

    /// The cell as this player currently knows it.
    #[must_use]
    pub fn cell(&self, coord: Coordinates) -> Option<&Cell> {
        self.view.get(coord)
    }

    /// Build the full per-player projected game delivered at `init`.
    #[must_use]
    pub fn projected_game(&self, game: &Game) -> Game {
        Game {
            players: game.players.clone(),
            grid: self.view.clone(),
            current_tick: game.current_tick,
            game_length: game.game_length,
            assigned_color: Some(self.player),
        }
    }
}

/// Count the cells still fogged in a view. Used by diagnostics only.
#[must_use]
pub fn fogged_cell_count(view: &PlayerView) -> usize {
    view.grid()
        .iter()
        .filter(|(_, cell)| cell.kind == CellKind::Invisible)
        .count()
}
