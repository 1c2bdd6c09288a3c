//! Watch command implementation - Interactive TUI viewer.

// CLI watch uses intentional casts for display and timing
#![allow(
    clippy::similar_names,
    clippy::needless_pass_by_value,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

use super::CliError;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use delve::game::{Cell, CellKind, Coordinates, Game, GameMap, PlayerId, WoodType};
use delve::replay::{Recording, ReplayEngine};
use delve::strategy::{StrategyRegistry, StrategySpec};
use delve::tournament::MatchConfig;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the TUI fails.
pub(crate) fn execute(
    map_path: PathBuf,
    strategies: Vec<String>,
    seed: Option<u64>,
    ticks: u32,
    speed: u64,
    player: Option<u8>,
) -> Result<(), CliError> {
    let map = GameMap::load(&map_path)?;
    let specs: Vec<StrategySpec> = strategies.iter().map(|s| StrategySpec::parse(s)).collect();

    let seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    });

    let config = MatchConfig {
        game_length: ticks,
        ..MatchConfig::default()
    };
    let recording = Recording {
        seed,
        game_length: config.game_length,
        time_budget_ms: config.time_budget_ms,
        strategies: specs,
        map,
    };
    let engine = ReplayEngine::new(recording, StrategyRegistry::builtin())?;

    run_tui(engine, speed, player)
}

/// App state for the TUI.
struct App {
    engine: ReplayEngine,
    paused: bool,
    speed_ms: u64,
    player_view: Option<PlayerId>,
    last_step: Instant,
    last_debug: Option<String>,
}

impl App {
    fn new(engine: ReplayEngine, speed_ms: u64, player_view: Option<u8>) -> Self {
        Self {
            engine,
            paused: true, // Start paused
            speed_ms,
            player_view,
            last_step: Instant::now(),
            last_debug: None,
        }
    }

    /// Ask the viewed player's strategy for its debug summary.
    fn refresh_debug(&mut self) {
        self.last_debug = self
            .player_view
            .and_then(|player| self.engine.debug(player));
    }

    fn step_forward(&mut self) {
        if !self.engine.is_over() {
            let _ = self.engine.step_forward();
            self.last_step = Instant::now();
        }
    }

    fn step_backward(&mut self) {
        let _ = self.engine.step_backward();
        self.last_step = Instant::now();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(100).max(50);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 100).min(2000);
    }

    fn should_auto_step(&self) -> bool {
        !self.paused
            && !self.engine.is_over()
            && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }

    /// The game to draw: authoritative, or a player's projection.
    fn displayed_game(&self) -> Game {
        match self
            .player_view
            .and_then(|player| self.engine.player_view(player))
        {
            Some(view) => view.projected_game(self.engine.state()),
            None => self.engine.state().clone(),
        }
    }
}

/// Drive the shared TUI over a replay engine.
///
/// # Errors
///
/// Returns an error if the terminal cannot be driven.
pub(crate) fn run_tui(
    engine: ReplayEngine,
    speed: u64,
    player: Option<u8>,
) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let mut app = App::new(engine, speed, player);

    loop {
        // Draw
        terminal
            .draw(|f| ui(f, &app))
            .map_err(|e| CliError::new(e.to_string()))?;

        // Auto-step if needed
        if app.should_auto_step() {
            app.step_forward();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(50)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    app.paused = true;
                    app.step_backward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') => {
                    let _ = app.engine.goto_tick(0);
                    app.paused = true;
                }
                KeyCode::Char('d') => app.refresh_debug(),
                KeyCode::Char('1'..='8') => {
                    let num = key.code.to_string().parse::<u8>().ok();
                    app.player_view = if app.player_view == num { None } else { num };
                }
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    // Header
    render_header(f, chunks[0], app);

    // Main content - map and stats
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    render_map(f, main_chunks[0], app);
    render_side_panel(f, main_chunks[1], app);

    // Footer
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let tick = app.engine.tick();
    let max_ticks = app.engine.recording().game_length;
    let score = app.engine.state().score();

    let status = if app.engine.is_over() {
        "MATCH OVER"
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };

    let view = app
        .player_view
        .map_or_else(|| "all".to_string(), |p| format!("player {p}"));

    let title = format!(
        " Delve Match Viewer | Tick {tick}/{max_ticks} | Score {score} | {status} | View: {view} | Speed: {}ms ",
        app.speed_ms
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_map(f: &mut Frame, area: Rect, app: &App) {
    let game = app.displayed_game();
    let grid = &game.grid;

    let visible_width = (area.width as usize).saturating_sub(4).min(grid.width() as usize);
    let visible_height = (area.height as usize)
        .saturating_sub(2)
        .min(grid.height() as usize);

    let mut lines: Vec<Line> = Vec::new();
    for row in 0..visible_height {
        let mut spans = Vec::new();
        for col in 0..visible_width {
            let coord = Coordinates::new(row as u16, col as u16);
            if let Some(cell) = grid.get(coord) {
                let (ch, color) = cell_to_char_color(cell);
                spans.push(Span::styled(ch, Style::default().fg(color)));
            } else {
                spans.push(Span::raw(" "));
            }
        }
        lines.push(Line::from(spans));
    }

    let map_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Grid "));

    f.render_widget(map_widget, area);
}

fn cell_to_char_color(cell: &Cell) -> (String, Color) {
    if let Some(player) = cell.occupants.first() {
        return (player.to_string(), player_color(*player));
    }

    match cell.kind {
        CellKind::Invisible => ("?".to_string(), Color::DarkGray),
        CellKind::Bedrock => ("#".to_string(), Color::DarkGray),
        CellKind::Stone { mine_count, .. } => {
            if mine_count == 0 {
                ("X".to_string(), Color::Gray)
            } else {
                (mine_count.min(9).to_string(), Color::White)
            }
        }
        CellKind::Empty { door: Some(door) } => {
            let glyph = if door.is_open { "d" } else { "D" };
            (glyph.to_string(), wood_color(door.wood_type))
        }
        CellKind::Empty { door: None } => {
            if cell.is_visited {
                (".".to_string(), Color::White)
            } else {
                (".".to_string(), Color::DarkGray)
            }
        }
        CellKind::PressurePlate { wood_type } => ("_".to_string(), wood_color(wood_type)),
        CellKind::Chest { is_opened, .. } => {
            if is_opened {
                ("o".to_string(), Color::Green)
            } else {
                ("$".to_string(), Color::LightGreen)
            }
        }
    }
}

fn render_side_panel(f: &mut Frame, area: Rect, app: &App) {
    let game = app.engine.state();
    let visited = game.visited_counts();
    let mut lines = Vec::new();

    lines.push(Line::from(""));
    for info in &game.grid.player_infos {
        let color = player_color(info.player);
        let spec = app
            .engine
            .recording()
            .strategies
            .get(
                game.players
                    .iter()
                    .position(|p| *p == info.player)
                    .unwrap_or_default(),
            )
            .map_or_else(String::new, ToString::to_string);

        lines.push(Line::from(vec![
            Span::styled(
                format!("Player {} ", info.player),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("({spec})")),
        ]));
        let idx = usize::from(info.player).saturating_sub(1);
        lines.push(Line::from(format!(
            "  Visited: {}",
            visited.get(idx).copied().unwrap_or(0)
        )));
        lines.push(Line::from(format!("  Budget: {}ms", info.remaining_time_ms)));
        if let Some(signal) = info.signal {
            lines.push(Line::from(vec![
                Span::raw("  Signal: "),
                Span::styled(format!("{signal:?}"), Style::default().fg(wood_color(signal))),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Recent events",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for event in app.engine.events().iter().rev().take(8) {
        lines.push(Line::from(format!("  {event}")));
    }

    if let Some(debug) = &app.last_debug {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Strategy debug",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {debug}")));
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Players "))
        .wrap(Wrap { trim: false });

    f.render_widget(panel, area);
}

fn player_color(id: PlayerId) -> Color {
    match id {
        1 => Color::Red,
        2 => Color::Blue,
        3 => Color::Green,
        4 => Color::Yellow,
        5 => Color::Magenta,
        6 => Color::Cyan,
        7 => Color::LightRed,
        8 => Color::LightBlue,
        _ => Color::White,
    }
}

fn wood_color(wood_type: WoodType) -> Color {
    match wood_type {
        WoodType::Oak => Color::Yellow,
        WoodType::Birch => Color::White,
        WoodType::Spruce => Color::Cyan,
        WoodType::Jungle => Color::Green,
        WoodType::Acacia => Color::Red,
        WoodType::DarkOak => Color::Magenta,
        WoodType::Crimson => Color::LightRed,
        WoodType::Warped => Color::LightCyan,
    }
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.engine.is_over() {
        " [q] Quit  [r] Restart  [←/→] Step  [1-8] Player view  [d] Debug "
    } else {
        " [q] Quit  [Space] Pause  [←/→] Step  [+/-] Speed  [r] Restart  [1-8] Player view  [d] Debug "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
