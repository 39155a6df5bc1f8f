//! Autotune command implementation.

use super::output::format_trial_text;
use super::{configure_threads, load_config, load_language, progress_bar, CliError};
use mathler::benchmark::{create_run_dir, run_dir_name, unix_timestamp};
use mathler::tune::{autotune, write_tune_run, TrialRecord, TunerConfig};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments of the autotune command.
#[derive(Debug)]
pub(crate) struct AutotuneArgs {
    pub(crate) trials: Option<usize>,
    pub(crate) games_per_trial: Option<usize>,
    pub(crate) seed: Option<u64>,
    pub(crate) out: PathBuf,
    pub(crate) threads: Option<usize>,
    pub(crate) progress: bool,
    pub(crate) grammar: Option<PathBuf>,
    pub(crate) config: Option<PathBuf>,
}

/// Execute the autotune command.
///
/// # Errors
///
/// Returns an error if the inputs are invalid, every trial is skipped, or the
/// results cannot be written.
pub(crate) fn execute(args: &AutotuneArgs) -> Result<(), CliError> {
    let base = load_config(args.config.as_deref())?;
    let language = load_language(args.grammar.as_deref(), base.game().expression_length)?;

    let defaults = TunerConfig::default();
    let tuner = TunerConfig {
        trials: args.trials.unwrap_or(defaults.trials),
        games_per_trial: args.games_per_trial.unwrap_or(defaults.games_per_trial),
        seed: args.seed.unwrap_or(base.search().seed),
        ..defaults
    };
    tuner.validate()?;

    let name = run_dir_name("tune", unix_timestamp(), None);
    let dir = create_run_dir(&args.out, &name)?;

    configure_threads(args.threads);
    let pb = progress_bar(args.progress, tuner.trials, "trials");

    let start = Instant::now();
    let report = autotune(&language, &base, &tuner, |_: &TrialRecord| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let report = report.ok_or_else(|| CliError::new("every sampled configuration was rejected"))?;

    write_tune_run(&dir, &report)?;

    println!();
    print!("{}", format_trial_text(report.best(), report.trials.len()));
    println!();
    println!("Duration: {:.2}s", start.elapsed().as_secs_f64());
    println!("Results: {}", dir.display());
    Ok(())
}
