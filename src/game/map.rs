//! The `GameMap` input contract.
//!
//! Maps are produced by an external generator and persisted as JSON
//! blobs. The engine treats them as opaque, already-generated starting
//! states: it only decodes, validates structural consistency, and hands
//! the grid to the runner.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::{CellKind, Coordinates, Grid, PlayerId, MAX_PLAYERS};

/// An initial match layout as delivered by the map generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMap {
    /// Participating players, in turn order.
    pub players: Vec<PlayerId>,
    /// Map size in 7x7 generation units per side.
    pub length_units: u16,
    /// Initial cell layout and starting player records.
    pub grid: Grid,
}

/// Error type for map decoding and validation.
#[derive(Debug)]
pub enum MapError {
    /// Reading the map file failed.
    Read(std::io::Error),
    /// The blob is not valid map JSON.
    Decode(serde_json::Error),
    /// The cell vector does not match the declared dimensions.
    CellCountMismatch {
        /// Cells found in the blob.
        found: usize,
        /// Cells implied by height x width.
        expected: usize,
    },
    /// No players are listed.
    NoPlayers,
    /// More players than the engine supports.
    TooManyPlayers(usize),
    /// The same player is listed twice.
    DuplicatePlayer(PlayerId),
    /// A listed player has no record in the grid.
    MissingPlayerInfo(PlayerId),
    /// A player's starting position is outside the grid.
    PositionOutOfBounds {
        /// The offending player.
        player: PlayerId,
        /// The out-of-bounds position.
        position: Coordinates,
    },
    /// A player starts on an impassable cell.
    ImpassableStart {
        /// The offending player.
        player: PlayerId,
        /// The impassable position.
        position: Coordinates,
    },
    /// The authoritative layout contains a fog placeholder.
    FogCell(Coordinates),
    /// Stones would be indestructible or trivially destroyed.
    InvalidStoneLife(u32),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "map file I/O failed: {e}"),
            Self::Decode(e) => write!(f, "map JSON error: {e}"),
            Self::CellCountMismatch { found, expected } => {
                write!(f, "cell count {found} does not match dimensions ({expected} expected)")
            }
            Self::NoPlayers => write!(f, "map lists no players"),
            Self::TooManyPlayers(n) => {
                write!(f, "map lists {n} players (maximum {MAX_PLAYERS})")
            }
            Self::DuplicatePlayer(p) => write!(f, "player {p} is listed twice"),
            Self::MissingPlayerInfo(p) => write!(f, "player {p} has no starting record"),
            Self::PositionOutOfBounds { player, position } => {
                write!(f, "player {player} starts out of bounds at {position:?}")
            }
            Self::ImpassableStart { player, position } => {
                write!(f, "player {player} starts on an impassable cell at {position:?}")
            }
            Self::FogCell(coord) => {
                write!(f, "authoritative layout contains a fog cell at {coord:?}")
            }
            Self::InvalidStoneLife(life) => write!(f, "invalid stone life {life}"),
        }
    }
}

impl std::error::Error for MapError {}

impl GameMap {
    /// Decode a map from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, decoded, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let bytes = fs::read(path).map_err(MapError::Read)?;
        let map: Self = serde_json::from_slice(&bytes).map_err(MapError::Decode)?;
        map.validate()?;
        Ok(map)
    }

    /// Encode this map to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        let json = serde_json::to_vec_pretty(self).map_err(MapError::Decode)?;
        fs::write(path, json).map_err(MapError::Read)
    }

    /// Check the structural invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), MapError> {
        let grid = &self.grid;
        let expected = usize::from(grid.height()) * usize::from(grid.width());
        let found = grid.iter().count();
        if found != expected {
            return Err(MapError::CellCountMismatch { found, expected });
        }

        if self.players.is_empty() {
            return Err(MapError::NoPlayers);
        }
        if self.players.len() > MAX_PLAYERS {
            return Err(MapError::TooManyPlayers(self.players.len()));
        }
        for (idx, player) in self.players.iter().enumerate() {
            if self.players[..idx].contains(player) {
                return Err(MapError::DuplicatePlayer(*player));
            }
        }

        if grid.stone_life == 0 {
            return Err(MapError::InvalidStoneLife(grid.stone_life));
        }

        for (coord, cell) in grid.iter() {
            if cell.kind == CellKind::Invisible {
                return Err(MapError::FogCell(coord));
            }
        }

        for player in &self.players {
            let info = grid
                .player_info(*player)
                .ok_or(MapError::MissingPlayerInfo(*player))?;
            let cell = grid
                .get(info.position)
                .ok_or(MapError::PositionOutOfBounds {
                    player: *player,
                    position: info.position,
                })?;
            if !cell.kind.is_passable() {
                return Err(MapError::ImpassableStart {
                    player: *player,
                    position: info.position,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, PlayerInfo};

    fn two_player_map() -> GameMap {
        let mut grid = Grid::new(9, 9).expect("non-zero dims");
        grid.player_infos = vec![
            PlayerInfo::new(1, Coordinates::new(1, 1)),
            PlayerInfo::new(2, Coordinates::new(7, 7)),
        ];
        GameMap {
            players: vec![1, 2],
            length_units: 1,
            grid,
        }
    }

    #[test]
    fn test_valid_map_passes() {
        assert!(two_player_map().validate().is_ok());
    }

    #[test]
    fn test_no_players_rejected() {
        let mut map = two_player_map();
        map.players.clear();
        assert!(matches!(map.validate(), Err(MapError::NoPlayers)));
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let mut map = two_player_map();
        map.players = vec![1, 1];
        assert!(matches!(map.validate(), Err(MapError::DuplicatePlayer(1))));
    }

    #[test]
    fn test_missing_record_rejected() {
        let mut map = two_player_map();
        map.grid.player_infos.pop();
        assert!(matches!(map.validate(), Err(MapError::MissingPlayerInfo(2))));
    }

    #[test]
    fn test_impassable_start_rejected() {
        let mut map = two_player_map();
        map.grid.set(Coordinates::new(1, 1), Cell::stone());
        assert!(matches!(
            map.validate(),
            Err(MapError::ImpassableStart { player: 1, .. })
        ));
    }

    #[test]
    fn test_fog_cell_rejected() {
        let mut map = two_player_map();
        map.grid.set(Coordinates::new(4, 4), Cell::invisible());
        assert!(matches!(map.validate(), Err(MapError::FogCell(_))));
    }

    #[test]
    fn test_zero_stone_life_rejected() {
        let mut map = two_player_map();
        map.grid.stone_life = 0;
        assert!(matches!(map.validate(), Err(MapError::InvalidStoneLife(0))));
    }

    #[test]
    fn test_json_roundtrip() {
        let map = two_player_map();
        let json = serde_json::to_string(&map).expect("encode");
        let decoded: GameMap = serde_json::from_str(&json).expect("decode");
        assert_eq!(decoded, map);
    }
}
