//! Mathler CLI - play, benchmark, and tune the arithmetic Wordle solver.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::EnvFilter;

/// Mathler - a grammar-constrained evolutionary solver for arithmetic Wordle
#[derive(Parser, Debug)]
#[command(name = "mathler")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one game and print every guess with its feedback
    Demo {
        /// Secret expression (default: drawn from the seed)
        #[arg(long)]
        secret: Option<String>,

        /// Game seed (default: the configuration's seed)
        #[arg(short, long)]
        seed: Option<u64>,

        /// BNF grammar file (default: built-in Mathler grammar)
        #[arg(short, long)]
        grammar: Option<PathBuf>,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Play many games in parallel and write CSV tables
    Benchmark {
        /// Number of games to play
        #[arg(short = 'n', long, default_value = "100")]
        games: usize,

        /// Run seed (game seeds derive from it)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Label appended to the run directory name
        #[arg(long)]
        tag: Option<String>,

        /// Include secrets in games.csv
        #[arg(long)]
        save_secrets: bool,

        /// Output directory
        #[arg(short, long, default_value = "runs")]
        out: PathBuf,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,

        /// BNF grammar file (default: built-in Mathler grammar)
        #[arg(short, long)]
        grammar: Option<PathBuf>,

        /// Configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Random-search search parameters and fitness weights, and save the best configuration
    Autotune {
        /// Configurations to sample
        #[arg(short, long)]
        trials: Option<usize>,

        /// Games played per configuration
        #[arg(long)]
        games_per_trial: Option<usize>,

        /// Tuner seed (trial seeds derive from it)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(short, long, default_value = "runs")]
        out: PathBuf,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,

        /// BNF grammar file (default: built-in Mathler grammar)
        #[arg(short, long)]
        grammar: Option<PathBuf>,

        /// Base configuration JSON file (game rules are kept)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Check whether an expression is a valid guess
    Check {
        /// Expression to check
        #[arg(required = true)]
        expression: String,

        /// BNF grammar file (default: built-in Mathler grammar)
        #[arg(short, long)]
        grammar: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Demo {
            secret,
            seed,
            grammar,
            config,
        } => cli::demo::execute(secret.as_deref(), seed, grammar.as_deref(), config.as_deref()),

        Commands::Benchmark {
            games,
            seed,
            tag,
            save_secrets,
            out,
            threads,
            progress,
            grammar,
            config,
        } => cli::benchmark::execute(&cli::benchmark::BenchmarkArgs {
            games,
            seed,
            tag,
            save_secrets,
            out,
            threads,
            progress,
            grammar,
            config,
        }),

        Commands::Autotune {
            trials,
            games_per_trial,
            seed,
            out,
            threads,
            progress,
            grammar,
            config,
        } => cli::autotune::execute(&cli::autotune::AutotuneArgs {
            trials,
            games_per_trial,
            seed,
            out,
            threads,
            progress,
            grammar,
            config,
        }),

        Commands::Check {
            expression,
            grammar,
        } => cli::check::execute(&expression, grammar.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
