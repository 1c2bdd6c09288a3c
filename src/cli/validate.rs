//! Map validation command implementation.

use super::CliError;
use delve::game::{CellKind, GameMap};
use std::path::PathBuf;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the map file cannot be read or is invalid.
pub(crate) fn execute(map_path: PathBuf) -> Result<(), CliError> {
    println!("Validating: {}", map_path.display());
    println!();

    // `load` validates after decoding; reaching Ok means both passed.
    let map = GameMap::load(&map_path)?;

    let grid = &map.grid;
    let mut stone = 0_usize;
    let mut doors = 0_usize;
    let mut plates = 0_usize;
    let mut chests = 0_usize;
    let mut chest_points = 0_u64;
    for (_, cell) in grid.iter() {
        match cell.kind {
            CellKind::Stone { .. } => stone += 1,
            CellKind::Empty { door: Some(_) } => doors += 1,
            CellKind::PressurePlate { .. } => plates += 1,
            CellKind::Chest { score, .. } => {
                chests += 1;
                chest_points += u64::from(score);
            }
            _ => {}
        }
    }

    println!("Summary:");
    println!("  Dimensions:   {}x{}", grid.height(), grid.width());
    println!("  Units:        {}x{}", map.length_units, map.length_units);
    println!("  Players:      {}", map.players.len());
    println!("  Stone life:   {}", grid.stone_life);
    println!("  Stone cells:  {stone}");
    println!("  Doors:        {doors}");
    println!("  Plates:       {plates}");
    println!("  Chests:       {chests} ({chest_points} points)");
    println!();
    println!("Validation successful!");

    Ok(())
}
