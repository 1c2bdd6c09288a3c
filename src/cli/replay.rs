//! Replay command implementation.

use super::{CliError, ReplayFormat};
use delve::replay::{render_player_view, Recording, ReplayEngine};
use delve::strategy::StrategyRegistry;
use std::path::PathBuf;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or replayed.
pub(crate) fn execute(
    recording: PathBuf,
    format: ReplayFormat,
    tick: Option<u32>,
    player: Option<u8>,
) -> Result<(), CliError> {
    let recording = Recording::load(&recording)?;
    let mut engine = ReplayEngine::new(recording, StrategyRegistry::builtin())?;

    if let Some(target) = tick {
        engine.goto_tick(target)?;
    }

    match format {
        ReplayFormat::Tui => super::watch::run_tui(engine, 500, player),
        ReplayFormat::Text => {
            let output = match player.and_then(|p| engine.player_view(p)) {
                Some(view) => render_player_view(view, engine.state()),
                None => engine.render_ascii(),
            };
            println!("{output}");
            Ok(())
        }
    }
}
