//! Grid, cell, and door types.

use serde::{Deserialize, Serialize};

use crate::game::{PlayerId, PlayerInfo};

/// Stone hit points used when a map does not override them.
pub const DEFAULT_STONE_LIFE: u32 = 5;

/// A coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    /// Row index (0-indexed, top to bottom).
    pub row: u16,
    /// Column index (0-indexed, left to right).
    pub col: u16,
}

impl Coordinates {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }

    /// The coordinate one step in `direction`, or `None` if it would
    /// leave a grid of the given dimensions.
    #[must_use]
    pub fn step(self, direction: Direction, height: u16, width: u16) -> Option<Self> {
        let stepped = match direction {
            Direction::Up => Self::new(self.row.checked_sub(1)?, self.col),
            Direction::Down => Self::new(self.row.checked_add(1)?, self.col),
            Direction::Left => Self::new(self.row, self.col.checked_sub(1)?),
            Direction::Right => Self::new(self.row, self.col.checked_add(1)?),
        };
        (stepped.row < height && stepped.col < width).then_some(stepped)
    }
}

/// One of the four cardinal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Toward column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Direction {
    /// All four directions, in a fixed deterministic order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

/// A key/lock color shared between doors and pressure plates.
///
/// A pressure plate activates every door of the same wood type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WoodType {
    /// Oak.
    Oak,
    /// Birch.
    Birch,
    /// Spruce.
    Spruce,
    /// Jungle.
    Jungle,
    /// Acacia.
    Acacia,
    /// Dark oak.
    DarkOak,
    /// Crimson.
    Crimson,
    /// Warped.
    Warped,
}

impl WoodType {
    /// Number of wood types.
    pub const COUNT: usize = 8;

    /// All wood types, in a fixed deterministic order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Oak,
        Self::Birch,
        Self::Spruce,
        Self::Jungle,
        Self::Acacia,
        Self::DarkOak,
        Self::Crimson,
        Self::Warped,
    ];

    /// Dense index for counter arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Oak => 0,
            Self::Birch => 1,
            Self::Spruce => 2,
            Self::Jungle => 3,
            Self::Acacia => 4,
            Self::DarkOak => 5,
            Self::Crimson => 6,
            Self::Warped => 7,
        }
    }
}

/// A door attached to one side of an empty cell.
///
/// A closed door blocks movement out of its cell in `direction`. Whether
/// it is open is derived from pressure-plate occupancy of the same wood
/// type; nothing else may set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    /// The side of the cell this door blocks.
    pub direction: Direction,
    /// The plate color that operates this door.
    pub wood_type: WoodType,
    /// Derived open state.
    #[serde(default)]
    pub is_open: bool,
    /// Optional countdown used by timed-door map variants.
    #[serde(default)]
    pub remaining_open_ticks: Option<u32>,
}

/// The terrain variant of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// Impassable and permanent.
    Bedrock,
    /// Impassable until mined down to nothing.
    Stone {
        /// Hits taken in the current streak.
        mine_count: u32,
        /// Tick of the most recent hit.
        last_mined_tick: u32,
    },
    /// Passable floor, optionally hosting a door.
    Empty {
        /// Door blocking one side of this cell, if any.
        door: Option<Door>,
    },
    /// Passable plate that operates all doors of its wood type.
    PressurePlate {
        /// The door color this plate operates.
        wood_type: WoodType,
    },
    /// Holds a score reward; opens on the first mine.
    Chest {
        /// Points awarded once opened.
        score: u32,
        /// Whether the chest has been opened.
        is_opened: bool,
    },
    /// Fog placeholder. Only ever appears in per-player projections,
    /// never in the authoritative grid.
    Invisible,
}

impl CellKind {
    /// Check whether a player may stand on this cell.
    ///
    /// Opened chests are walkable; everything else impassable stays so.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        match self {
            Self::Empty { .. } | Self::PressurePlate { .. } => true,
            Self::Chest { is_opened, .. } => is_opened,
            Self::Bedrock | Self::Stone { .. } | Self::Invisible => false,
        }
    }

    /// The door hosted by this cell, if any.
    #[must_use]
    pub const fn door(&self) -> Option<&Door> {
        match self {
            Self::Empty { door } => door.as_ref(),
            _ => None,
        }
    }
}

/// A single cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Terrain variant.
    pub kind: CellKind,
    /// Players currently standing on this cell.
    #[serde(default)]
    pub occupants: Vec<PlayerId>,
    /// The first player ever to stand here. Write-once.
    #[serde(default)]
    pub first_visit: Option<PlayerId>,
    /// Whether any player has ever stood here.
    #[serde(default)]
    pub is_visited: bool,
}

impl Cell {
    /// Create a cell of the given kind with no visit history.
    #[must_use]
    pub const fn new(kind: CellKind) -> Self {
        Self {
            kind,
            occupants: Vec::new(),
            first_visit: None,
            is_visited: false,
        }
    }

    /// Create a bedrock cell.
    #[must_use]
    pub const fn bedrock() -> Self {
        Self::new(CellKind::Bedrock)
    }

    /// Create an undamaged stone cell.
    #[must_use]
    pub const fn stone() -> Self {
        Self::new(CellKind::Stone {
            mine_count: 0,
            last_mined_tick: 0,
        })
    }

    /// Create an empty cell without a door.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(CellKind::Empty { door: None })
    }

    /// Create an empty cell hosting a door.
    #[must_use]
    pub const fn with_door(door: Door) -> Self {
        Self::new(CellKind::Empty { door: Some(door) })
    }

    /// Create a pressure plate of the given wood type.
    #[must_use]
    pub const fn pressure_plate(wood_type: WoodType) -> Self {
        Self::new(CellKind::PressurePlate { wood_type })
    }

    /// Create an unopened chest worth `score` points.
    #[must_use]
    pub const fn chest(score: u32) -> Self {
        Self::new(CellKind::Chest {
            score,
            is_opened: false,
        })
    }

    /// Create the fog placeholder used in projections.
    #[must_use]
    pub const fn invisible() -> Self {
        Self::new(CellKind::Invisible)
    }
}

/// The game grid: a rectangular matrix of cells plus per-player records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Height in cells.
    height: u16,
    /// Width in cells.
    width: u16,
    /// Stone hit points for this map.
    #[serde(default = "default_stone_life")]
    pub stone_life: u32,
    /// Cells in row-major order.
    cells: Vec<Cell>,
    /// One record per participating player.
    pub player_infos: Vec<PlayerInfo>,
}

const fn default_stone_life() -> u32 {
    DEFAULT_STONE_LIFE
}

impl Grid {
    /// Create a grid filled with empty cells and no players.
    ///
    /// Returns `None` if either dimension is zero.
    #[must_use]
    pub fn new(height: u16, width: u16) -> Option<Self> {
        if height == 0 || width == 0 {
            return None;
        }
        let size = usize::from(height) * usize::from(width);
        Some(Self {
            height,
            width,
            stone_life: DEFAULT_STONE_LIFE,
            cells: vec![Cell::empty(); size],
            player_infos: Vec::new(),
        })
    }

    /// Create a grid filled with the fog placeholder, for projections.
    #[must_use]
    pub fn new_fogged(height: u16, width: u16) -> Option<Self> {
        let mut grid = Self::new(height, width)?;
        grid.cells.fill(Cell::invisible());
        Some(grid)
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Check if a coordinate is within bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coordinates) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Convert a coordinate to an index into the cell vector.
    fn coord_to_index(&self, coord: Coordinates) -> Option<usize> {
        self.in_bounds(coord)
            .then(|| usize::from(coord.row) * usize::from(self.width) + usize::from(coord.col))
    }

    /// Get the cell at a coordinate.
    #[must_use]
    pub fn get(&self, coord: Coordinates) -> Option<&Cell> {
        self.coord_to_index(coord).map(|idx| &self.cells[idx])
    }

    /// Get the cell at a coordinate, mutably.
    #[must_use]
    pub fn get_mut(&mut self, coord: Coordinates) -> Option<&mut Cell> {
        self.coord_to_index(coord).map(|idx| &mut self.cells[idx])
    }

    /// Replace the cell at a coordinate.
    ///
    /// Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, coord: Coordinates, cell: Cell) -> bool {
        if let Some(idx) = self.coord_to_index(coord) {
            self.cells[idx] = cell;
            true
        } else {
            false
        }
    }

    /// Iterate over all coordinates and cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinates, &Cell)> {
        let width = usize::from(self.width);
        self.cells.iter().enumerate().map(move |(idx, cell)| {
            #[allow(clippy::cast_possible_truncation)]
            let coord = Coordinates::new((idx / width) as u16, (idx % width) as u16);
            (coord, cell)
        })
    }

    /// The record for a player, if they participate in this match.
    #[must_use]
    pub fn player_info(&self, player: PlayerId) -> Option<&PlayerInfo> {
        self.player_infos.iter().find(|info| info.player == player)
    }

    /// The record for a player, mutably.
    #[must_use]
    pub fn player_info_mut(&mut self, player: PlayerId) -> Option<&mut PlayerInfo> {
        self.player_infos
            .iter_mut()
            .find(|info| info.player == player)
    }

    /// Coordinates of every door of the given wood type.
    #[must_use]
    pub fn doors_of(&self, wood_type: WoodType) -> Vec<Coordinates> {
        self.iter()
            .filter(|(_, cell)| {
                cell.kind
                    .door()
                    .is_some_and(|door| door.wood_type == wood_type)
            })
            .map(|(coord, _)| coord)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_step_interior() {
        let coord = Coordinates::new(5, 5);
        assert_eq!(
            coord.step(Direction::Up, 10, 10),
            Some(Coordinates::new(4, 5))
        );
        assert_eq!(
            coord.step(Direction::Down, 10, 10),
            Some(Coordinates::new(6, 5))
        );
        assert_eq!(
            coord.step(Direction::Left, 10, 10),
            Some(Coordinates::new(5, 4))
        );
        assert_eq!(
            coord.step(Direction::Right, 10, 10),
            Some(Coordinates::new(5, 6))
        );
    }

    #[test]
    fn test_coord_step_edges() {
        let origin = Coordinates::new(0, 0);
        assert_eq!(origin.step(Direction::Up, 10, 10), None);
        assert_eq!(origin.step(Direction::Left, 10, 10), None);

        let corner = Coordinates::new(9, 9);
        assert_eq!(corner.step(Direction::Down, 10, 10), None);
        assert_eq!(corner.step(Direction::Right, 10, 10), None);
    }

    #[test]
    fn test_passability() {
        assert!(Cell::empty().kind.is_passable());
        assert!(Cell::pressure_plate(WoodType::Oak).kind.is_passable());
        assert!(!Cell::bedrock().kind.is_passable());
        assert!(!Cell::stone().kind.is_passable());
        assert!(!Cell::chest(10).kind.is_passable());
        assert!(!Cell::invisible().kind.is_passable());

        let opened = CellKind::Chest {
            score: 10,
            is_opened: true,
        };
        assert!(opened.is_passable());
    }

    #[test]
    fn test_grid_zero_size() {
        assert!(Grid::new(0, 10).is_none());
        assert!(Grid::new(10, 0).is_none());
    }

    #[test]
    fn test_grid_get_set() {
        let mut grid = Grid::new(10, 12).expect("non-zero dims");
        let coord = Coordinates::new(3, 11);

        assert_eq!(
            grid.get(coord).map(|c| c.kind),
            Some(CellKind::Empty { door: None })
        );
        assert!(grid.set(coord, Cell::chest(30)));
        assert_eq!(
            grid.get(coord).map(|c| c.kind),
            Some(CellKind::Chest {
                score: 30,
                is_opened: false
            })
        );

        assert!(grid.get(Coordinates::new(10, 0)).is_none());
        assert!(!grid.set(Coordinates::new(0, 12), Cell::empty()));
    }

    #[test]
    fn test_doors_of_filters_by_wood() {
        let mut grid = Grid::new(5, 5).expect("non-zero dims");
        let oak = Door {
            direction: Direction::Up,
            wood_type: WoodType::Oak,
            is_open: false,
            remaining_open_ticks: None,
        };
        let birch = Door {
            wood_type: WoodType::Birch,
            ..oak
        };
        grid.set(Coordinates::new(1, 1), Cell::with_door(oak));
        grid.set(Coordinates::new(2, 2), Cell::with_door(birch));
        grid.set(Coordinates::new(3, 3), Cell::with_door(oak));

        assert_eq!(
            grid.doors_of(WoodType::Oak),
            vec![Coordinates::new(1, 1), Coordinates::new(3, 3)]
        );
        assert_eq!(grid.doors_of(WoodType::Birch), vec![Coordinates::new(2, 2)]);
        assert!(grid.doors_of(WoodType::Spruce).is_empty());
    }

    #[test]
    fn test_wood_type_index_is_dense() {
        for (expected, wood) in WoodType::ALL.iter().enumerate() {
            assert_eq!(wood.index(), expected);
        }
    }
}
