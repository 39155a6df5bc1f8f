//! Benchmark command implementation.

use super::output::format_summary_text;
use super::{configure_threads, load_config, load_language, progress_bar, CliError};
use mathler::benchmark::{
    create_run_dir, run_dir_name, run_games, unix_timestamp, write_run, BenchmarkSummary,
};
use mathler::GameReport;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments of the benchmark command.
#[derive(Debug)]
pub(crate) struct BenchmarkArgs {
    pub(crate) games: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) tag: Option<String>,
    pub(crate) save_secrets: bool,
    pub(crate) out: PathBuf,
    pub(crate) threads: Option<usize>,
    pub(crate) progress: bool,
    pub(crate) grammar: Option<PathBuf>,
    pub(crate) config: Option<PathBuf>,
}

/// Execute the benchmark command.
///
/// # Errors
///
/// Returns an error if loading inputs or writing the run directory fails.
pub(crate) fn execute(args: &BenchmarkArgs) -> Result<(), CliError> {
    if args.games == 0 {
        return Err(CliError::new("--games must be at least 1"));
    }
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let language = load_language(args.grammar.as_deref(), config.game().expression_length)?;

    let name = run_dir_name("run", unix_timestamp(), args.tag.as_deref());
    let dir = create_run_dir(&args.out, &name)?;

    configure_threads(args.threads);
    let pb = progress_bar(args.progress, args.games, "games");

    let start = Instant::now();
    let reports = run_games(&language, &config, args.games, |_: &GameReport| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    });
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    write_run(&dir, &config, &reports, args.save_secrets)?;

    let summary = BenchmarkSummary::from_reports(&reports, config.game().max_guesses);
    println!();
    print!("{}", format_summary_text(&summary));
    println!();
    println!("Duration: {:.2}s", duration.as_secs_f64());
    println!("Results: {}", dir.display());
    Ok(())
}
