//! Delve CLI - Command-line interface for running and viewing matches.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Delve - A deterministic grid-world match engine
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single match on a map
    Run {
        /// Map file (JSON GameMap)
        #[arg(required = true)]
        map: std::path::PathBuf,

        /// Strategies, one per player in turn order (NAME or NAME:CONFIG)
        #[arg(short, long = "strategy", required = true, num_args = 1..=8)]
        strategies: Vec<String>,

        /// Match seed (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Tick budget (default: 300)
        #[arg(short, long, default_value = "300")]
        ticks: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save a recording to file
        #[arg(long)]
        save: Option<std::path::PathBuf>,

        /// Suppress setup output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Interactive TUI to watch a match in real-time
    Watch {
        /// Map file (JSON GameMap)
        #[arg(required = true)]
        map: std::path::PathBuf,

        /// Strategies, one per player in turn order (NAME or NAME:CONFIG)
        #[arg(short, long = "strategy", required = true, num_args = 1..=8)]
        strategies: Vec<String>,

        /// Match seed
        #[arg(long)]
        seed: Option<u64>,

        /// Tick budget (default: 300)
        #[arg(short, long, default_value = "300")]
        ticks: u32,

        /// Tick delay in milliseconds (default: 500)
        #[arg(long, default_value = "500")]
        speed: u64,

        /// View from player N's perspective (1-8, default: all)
        #[arg(short, long)]
        player: Option<u8>,
    },

    /// Replay a recorded match
    Replay {
        /// Recording file (JSON)
        #[arg(required = true)]
        recording: std::path::PathBuf,

        /// Output format: tui or text
        #[arg(short, long, default_value = "tui")]
        format: cli::ReplayFormat,

        /// Jump to a specific tick first
        #[arg(short, long)]
        tick: Option<u32>,

        /// View from player N's perspective (1-8, default: all)
        #[arg(short, long)]
        player: Option<u8>,
    },

    /// Run mass parallel matches and aggregate statistics
    Tournament {
        /// Map file (JSON GameMap)
        #[arg(required = true)]
        map: std::path::PathBuf,

        /// Strategies, one per player in turn order (NAME or NAME:CONFIG)
        #[arg(short, long = "strategy", required = true, num_args = 1..=8)]
        strategies: Vec<String>,

        /// Number of matches to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each match)
        #[arg(long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Tick budget per match (default: 300)
        #[arg(short, long)]
        ticks: Option<u32>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::TournamentFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a map file for engine compatibility
    Validate {
        /// Map file to validate
        #[arg(required = true)]
        map: std::path::PathBuf,
    },

    /// List registered strategies
    Strategies,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Run {
            map,
            strategies,
            seed,
            ticks,
            format,
            save,
            quiet,
        } => cli::run::execute(map, strategies, seed, ticks, format, save, quiet),

        Commands::Watch {
            map,
            strategies,
            seed,
            ticks,
            speed,
            player,
        } => cli::watch::execute(map, strategies, seed, ticks, speed, player),

        Commands::Replay {
            recording,
            format,
            tick,
            player,
        } => cli::replay::execute(recording, format, tick, player),

        Commands::Tournament {
            map,
            strategies,
            games,
            seed,
            threads,
            ticks,
            format,
            progress,
        } => cli::tournament::execute(map, strategies, games, seed, threads, ticks, format, progress),

        Commands::Validate { map } => cli::validate::execute(map),

        Commands::Strategies => cli::strategies::execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
