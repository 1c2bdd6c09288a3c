//! Tournament command implementation.

use super::output::{format_series_csv, format_series_text, JsonSeriesResult, SeriesStats};
use super::{CliError, TournamentFormat};
use delve::game::GameMap;
use delve::strategy::{StrategyRegistry, StrategySpec};
use delve::tournament::{run_match, MatchConfig, MatchResult};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the series fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    map_path: PathBuf,
    strategies: Vec<String>,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    ticks: Option<u32>,
    format: TournamentFormat,
    progress: bool,
) -> Result<(), CliError> {
    let map = GameMap::load(&map_path)?;
    let specs: Vec<StrategySpec> = strategies.iter().map(|s| StrategySpec::parse(s)).collect();
    let spec_names: Vec<String> = specs.iter().map(ToString::to_string).collect();
    let registry = StrategyRegistry::builtin();

    let base_seed = seed.unwrap_or(1);
    let mut config = MatchConfig::default();
    if let Some(ticks) = ticks {
        config.game_length = ticks;
    }

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let bar = if progress {
        let bar = ProgressBar::new(games);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} matches",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    let started = Instant::now();
    let results: Result<Vec<MatchResult>, _> = (0..games)
        .into_par_iter()
        .map(|offset| {
            let result = run_match(
                base_seed.wrapping_add(offset),
                &map,
                &specs,
                &registry,
                &config,
            );
            if let Some(bar) = &bar {
                bar.inc(1);
            }
            result
        })
        .collect();
    let results = results?;
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let mut stats = SeriesStats::new();
    for result in &results {
        stats.add_result(result);
    }

    match format {
        TournamentFormat::Text => {
            print!("{}", format_series_text(&stats, &spec_names));
            println!(
                "\nCompleted {} matches in {:.1}s",
                results.len(),
                started.elapsed().as_secs_f64()
            );
        }
        TournamentFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonSeriesResult::from_stats(&stats))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        TournamentFormat::Csv => {
            print!("{}", format_series_csv(&stats));
        }
    }

    Ok(())
}
