//! ASCII renderer for terminal viewing with ANSI colors.
//!
//! Renders either the authoritative grid or a per-player projection
//! (fogged cells show as `?`). The engine knows nothing about this
//! module; it consumes only the public state accessors.

use crate::game::{CellKind, Game, PlayerId, WoodType};
use crate::visibility::PlayerView;

/// ANSI color codes for players 1-8.
const PLAYER_COLORS: [&str; 8] = [
    "\x1b[31m", // Player 1: Red
    "\x1b[34m", // Player 2: Blue
    "\x1b[32m", // Player 3: Green
    "\x1b[33m", // Player 4: Yellow
    "\x1b[35m", // Player 5: Magenta
    "\x1b[36m", // Player 6: Cyan
    "\x1b[91m", // Player 7: Bright Red
    "\x1b[94m", // Player 8: Bright Blue
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GRAY: &str = "\x1b[90m";
const GREEN: &str = "\x1b[32m";

/// ANSI color for a wood type (doors and plates).
const fn wood_color(wood_type: WoodType) -> &'static str {
    match wood_type {
        WoodType::Oak => "\x1b[33m",
        WoodType::Birch => "\x1b[97m",
        WoodType::Spruce => "\x1b[36m",
        WoodType::Jungle => "\x1b[32m",
        WoodType::Acacia => "\x1b[31m",
        WoodType::DarkOak => "\x1b[35m",
        WoodType::Crimson => "\x1b[91m",
        WoodType::Warped => "\x1b[96m",
    }
}

/// ANSI color for a player.
fn player_color(player: PlayerId) -> &'static str {
    let idx = usize::from(player).saturating_sub(1);
    PLAYER_COLORS.get(idx).copied().unwrap_or(RESET)
}

/// Render a game (authoritative or projected) as colored ASCII.
#[must_use]
pub fn render_ascii(game: &Game) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Tick {}/{}    Score: {}",
        game.current_tick,
        game.game_length,
        game.score()
    ));
    if let Some(me) = game.assigned_color {
        output.push_str(&format!("    (player {me}'s view)"));
    }
    output.push('\n');

    render_grid(&mut output, game);
    output.push('\n');
    render_player_lines(&mut output, game);

    output
}

/// Render a player's private projection.
#[must_use]
pub fn render_player_view(view: &PlayerView, game: &Game) -> String {
    render_ascii(&view.projected_game(game))
}

fn render_grid(output: &mut String, game: &Game) {
    let width = game.grid.width();

    output.push('┌');
    for _ in 0..(width * 2 + 1) {
        output.push('─');
    }
    output.push_str("┐\n");

    let mut row_cursor = 0;
    output.push_str("│ ");
    for (coord, cell) in game.grid.iter() {
        if coord.row != row_cursor {
            output.push_str("│\n│ ");
            row_cursor = coord.row;
        }
        render_cell(output, cell);
        output.push(' ');
    }
    output.push_str("│\n");

    output.push('└');
    for _ in 0..(width * 2 + 1) {
        output.push('─');
    }
    output.push_str("┘\n");
}

fn render_cell(output: &mut String, cell: &crate::game::Cell) {
    if let Some(player) = cell.occupants.first() {
        output.push_str(&format!("{}{BOLD}{player}{RESET}", player_color(*player)));
        return;
    }

    match cell.kind {
        CellKind::Invisible => output.push_str(&format!("{GRAY}?{RESET}")),
        CellKind::Bedrock => output.push_str(&format!("{DIM}#{RESET}")),
        CellKind::Stone { mine_count, .. } => {
            if mine_count == 0 {
                output.push_str(&format!("{GRAY}X{RESET}"));
            } else {
                let digit = char::from_digit(mine_count.min(9), 10).unwrap_or('9');
                output.push_str(&format!("{GRAY}{BOLD}{digit}{RESET}"));
            }
        }
        CellKind::Empty { door: Some(door) } => {
            let glyph = if door.is_open { 'd' } else { 'D' };
            output.push_str(&format!("{}{glyph}{RESET}", wood_color(door.wood_type)));
        }
        CellKind::Empty { door: None } => {
            if cell.is_visited {
                output.push('.');
            } else {
                output.push_str(&format!("{DIM}.{RESET}"));
            }
        }
        CellKind::PressurePlate { wood_type } => {
            output.push_str(&format!("{}_{RESET}", wood_color(wood_type)));
        }
        CellKind::Chest { is_opened, .. } => {
            if is_opened {
                output.push_str(&format!("{GREEN}{DIM}o{RESET}"));
            } else {
                output.push_str(&format!("{GREEN}{BOLD}${RESET}"));
            }
        }
    }
}

fn render_player_lines(output: &mut String, game: &Game) {
    let visited = game.visited_counts();
    for info in &game.grid.player_infos {
        let color = player_color(info.player);
        let idx = usize::from(info.player).saturating_sub(1);
        let signal = info
            .signal
            .map_or_else(|| "-".to_string(), |wood| format!("{wood:?}"));
        output.push_str(&format!(
            "{color}Player {}{RESET}: at ({},{})  visited: {}  budget: {}ms  signal: {signal}\n",
            info.player,
            info.position.row,
            info.position.col,
            visited.get(idx).copied().unwrap_or(0),
            info.remaining_time_ms,
        ));
    }
}
