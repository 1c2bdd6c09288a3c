//! Output formatting utilities for CLI.

use delve::tournament::MatchResult;
use serde::Serialize;

/// JSON-serializable match result.
#[derive(Debug, Serialize)]
pub(super) struct JsonMatchResult {
    /// Seed used.
    pub(super) seed: u64,
    /// Final global score.
    pub(super) score: u64,
    /// Ticks played.
    pub(super) ticks_played: u32,
    /// Per-player results.
    pub(super) players: Vec<JsonPlayerResult>,
}

/// JSON-serializable per-player result.
#[derive(Debug, Serialize)]
pub(super) struct JsonPlayerResult {
    /// Player ID (1-8).
    pub(super) id: u8,
    /// Strategy spec the seat ran.
    pub(super) strategy: String,
    /// Cells this player visited first.
    pub(super) visited: u32,
    /// Remaining time budget in milliseconds.
    pub(super) remaining_time_ms: i64,
    /// Whether the strategy faulted and forfeited.
    pub(super) faulted: bool,
}

impl JsonMatchResult {
    /// Create from a `MatchResult`.
    pub(super) fn from_match_result(result: &MatchResult, specs: &[String]) -> Self {
        Self {
            seed: result.seed,
            score: result.score,
            ticks_played: result.ticks_played,
            players: result
                .remaining_time_ms
                .iter()
                .enumerate()
                .map(|(idx, (player, remaining))| JsonPlayerResult {
                    id: *player,
                    strategy: specs.get(idx).cloned().unwrap_or_default(),
                    visited: result
                        .visited_counts
                        .get(usize::from(*player).saturating_sub(1))
                        .copied()
                        .unwrap_or(0),
                    remaining_time_ms: *remaining,
                    faulted: result.faulted.contains(player),
                })
                .collect(),
        }
    }
}

/// Format a match result as human-readable text.
pub(super) fn format_text(result: &MatchResult, specs: &[String]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Match Result (seed: {})\n", result.seed));
    output.push_str(&format!("  Score: {}\n", result.score));
    output.push_str(&format!("  Ticks: {}\n\n", result.ticks_played));

    for (idx, (player, remaining)) in result.remaining_time_ms.iter().enumerate() {
        let spec = specs.get(idx).map_or("unknown", String::as_str);
        let visited = result
            .visited_counts
            .get(usize::from(*player).saturating_sub(1))
            .copied()
            .unwrap_or(0);
        output.push_str(&format!(
            "  Player {player}: {visited} cells first-visited ({spec}), {remaining}ms left"
        ));
        if result.faulted.contains(player) {
            output.push_str(" [FAULTED]");
        }
        output.push('\n');
    }

    output
}

/// Aggregated statistics over a series of matches.
#[derive(Debug, Default)]
pub(super) struct SeriesStats {
    /// Matches aggregated.
    pub(super) games_played: u64,
    /// Total score across matches.
    total_score: u64,
    /// Score sum of squares for std dev calculation.
    score_sq_sum: f64,
    /// Best score seen.
    pub(super) best_score: u64,
    /// Worst score seen.
    pub(super) worst_score: u64,
    /// Seed of the best match.
    pub(super) best_seed: u64,
    /// Total faulted seats across matches.
    pub(super) faults: u64,
}

impl SeriesStats {
    /// Create empty stats.
    pub(super) fn new() -> Self {
        Self {
            worst_score: u64::MAX,
            ..Self::default()
        }
    }

    /// Add a match result.
    pub(super) fn add_result(&mut self, result: &MatchResult) {
        self.games_played += 1;
        self.total_score += result.score;
        #[allow(clippy::cast_precision_loss)]
        {
            self.score_sq_sum += (result.score as f64) * (result.score as f64);
        }
        if result.score > self.best_score {
            self.best_score = result.score;
            self.best_seed = result.seed;
        }
        self.worst_score = self.worst_score.min(result.score);
        self.faults += result.faulted.len() as u64;
    }

    /// Mean score across matches.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_score(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.games_played as f64
    }

    /// Score standard deviation across matches.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn score_std_dev(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        let n = self.games_played as f64;
        let mean = self.avg_score();
        let variance = (self.score_sq_sum / n) - (mean * mean);
        if variance < 0.0 {
            0.0
        } else {
            variance.sqrt()
        }
    }
}

/// JSON-serializable series result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSeriesResult {
    /// Matches played.
    games_played: u64,
    /// Mean score.
    avg_score: f64,
    /// Score standard deviation.
    score_std_dev: f64,
    /// Best score and its seed.
    best_score: u64,
    /// Seed that produced the best score.
    best_seed: u64,
    /// Worst score.
    worst_score: u64,
    /// Faulted seats across the series.
    faults: u64,
}

impl JsonSeriesResult {
    /// Create from aggregated stats.
    pub(super) fn from_stats(stats: &SeriesStats) -> Self {
        Self {
            games_played: stats.games_played,
            avg_score: stats.avg_score(),
            score_std_dev: stats.score_std_dev(),
            best_score: stats.best_score,
            best_seed: stats.best_seed,
            worst_score: stats.worst_score,
            faults: stats.faults,
        }
    }
}

/// Format series stats as human-readable text.
pub(super) fn format_series_text(stats: &SeriesStats, specs: &[String]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Series Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");
    output.push_str(&format!("  Lineup: {}\n", specs.join(", ")));
    output.push_str(&format!(
        "  Score: {:.1} avg (+/- {:.1})\n",
        stats.avg_score(),
        stats.score_std_dev()
    ));
    output.push_str(&format!(
        "  Best: {} (seed {})\n",
        stats.best_score, stats.best_seed
    ));
    output.push_str(&format!("  Worst: {}\n", stats.worst_score));
    output.push_str(&format!("  Faulted seats: {}\n", stats.faults));

    output
}

/// Format series stats as CSV.
pub(super) fn format_series_csv(stats: &SeriesStats) -> String {
    let mut output = String::new();
    output.push_str("games_played,avg_score,score_std_dev,best_score,best_seed,worst_score,faults\n");
    output.push_str(&format!(
        "{},{:.2},{:.2},{},{},{},{}\n",
        stats.games_played,
        stats.avg_score(),
        stats.score_std_dev(),
        stats.best_score,
        stats.best_seed,
        stats.worst_score,
        stats.faults
    ));
    output
}
