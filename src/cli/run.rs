//! Run command implementation.

use super::output::{format_text, JsonMatchResult};
use super::{CliError, OutputFormat};
use delve::game::GameMap;
use delve::replay::Recording;
use delve::strategy::{StrategyRegistry, StrategySpec};
use delve::tournament::{run_match, MatchConfig};
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the match fails to run.
pub(crate) fn execute(
    map_path: PathBuf,
    strategies: Vec<String>,
    seed: Option<u64>,
    ticks: u32,
    format: OutputFormat,
    save: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let map = GameMap::load(&map_path)?;
    let specs: Vec<StrategySpec> = strategies.iter().map(|s| StrategySpec::parse(s)).collect();
    let spec_names: Vec<String> = specs.iter().map(ToString::to_string).collect();

    // Generate seed if not provided
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
    let registry = StrategyRegistry::builtin();

    if !quiet {
        println!("Running match with seed {seed}...");
        println!("Map: {} ({} players)", map_path.display(), map.players.len());
        println!("Lineup: {}", spec_names.join(", "));
        println!();
    }

    let result = run_match(seed, &map, &specs, &registry, &config)?;

    // Save recording if requested
    if let Some(save_path) = save {
        let recording = Recording {
            seed,
            game_length: config.game_length,
            time_budget_ms: config.time_budget_ms,
            strategies: specs,
            map,
        };
        recording
            .save(&save_path)
            .map_err(|e| CliError::new(format!("Failed to save recording: {e}")))?;
        if !quiet {
            println!("Recording saved to: {}", save_path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result, &spec_names));
        }
        OutputFormat::Json => {
            let json_result = JsonMatchResult::from_match_result(&result, &spec_names);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
