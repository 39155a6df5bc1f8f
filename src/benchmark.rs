//! Batch runs of many games under one configuration.
//!
//! Games run in parallel with rayon. Each game owns its random streams,
//! derived from the run seed and its index, so results do not depend on the
//! thread count. Reports are written as three CSV tables (games, guesses,
//! generations) next to the configuration that produced them.

// Statistics use intentional casts
#![allow(clippy::cast_precision_loss)]

use crate::config::Configuration;
use crate::error::BenchmarkError;
use crate::game::run_game;
use crate::grammar::Language;
use crate::metrics::{GameReport, Outcome};
use crate::rng::derive_seed;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Guesses charged to a game that was not won.
pub const FAILED_GAME_PENALTY: usize = 4;

/// Play `games` games in parallel, calling `on_done` as each finishes.
///
/// Games whose secret cannot be drawn are logged and skipped. The result is
/// ordered by game id.
pub fn run_games<F>(
    language: &Language,
    config: &Configuration,
    games: usize,
    on_done: F,
) -> Vec<GameReport>
where
    F: Fn(&GameReport) + Sync,
{
    let run_seed = config.search().seed;
    let mut reports: Vec<GameReport> = (0..games)
        .into_par_iter()
        .filter_map(|game_id| {
            let seed = derive_seed(run_seed, game_id as u64);
            match run_game(language, config, game_id, seed, None) {
                Ok(report) => {
                    on_done(&report);
                    Some(report)
                }
                Err(e) => {
                    warn!(game_id, seed, error = %e, "no secret could be drawn, skipping game");
                    None
                }
            }
        })
        .collect();
    reports.sort_by_key(|r| r.game_id);
    reports
}

/// Aggregate results of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    /// Games played.
    pub games: usize,
    /// Games won.
    pub wins: usize,
    /// Games lost on the guess limit.
    pub losses: usize,
    /// Games aborted by search exhaustion.
    pub aborted: usize,
    /// Fraction of games won.
    pub win_rate: f64,
    /// Mean guesses, charging unwon games `max_guesses + FAILED_GAME_PENALTY`.
    pub mean_guesses: f64,
    /// Median of the same per-game guess counts.
    pub median_guesses: f64,
    /// Evaluation failures summed over all games.
    pub eval_failures: usize,
}

impl BenchmarkSummary {
    /// Summarise `reports` played with at most `max_guesses` guesses.
    #[must_use]
    pub fn from_reports(reports: &[GameReport], max_guesses: usize) -> Self {
        let count = |outcome| reports.iter().filter(|r| r.outcome == outcome).count();
        let charged: Vec<usize> = reports
            .iter()
            .map(|r| charged_guesses(r, max_guesses))
            .collect();
        let games = reports.len();
        let wins = count(Outcome::Won);

        Self {
            games,
            wins,
            losses: count(Outcome::Lost),
            aborted: count(Outcome::Aborted),
            win_rate: if games == 0 { 0.0 } else { wins as f64 / games as f64 },
            mean_guesses: mean(&charged),
            median_guesses: median(&charged),
            eval_failures: reports.iter().map(GameReport::eval_failures).sum(),
        }
    }
}

/// Guesses counted for one game when aggregating.
#[must_use]
pub fn charged_guesses(report: &GameReport, max_guesses: usize) -> usize {
    if report.outcome == Outcome::Won {
        report.guess_count()
    } else {
        max_guesses + FAILED_GAME_PENALTY
    }
}

pub(crate) fn mean(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

pub(crate) fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Game-level table. The secret column is empty unless `save_secrets`.
#[must_use]
pub fn format_games_csv(run_id: &str, reports: &[GameReport], save_secrets: bool) -> String {
    let mut output = String::new();
    output.push_str("run_id,game_id,seed,secret,target,outcome,guesses,eval_failures,runtime_s\n");
    for r in reports {
        let secret = if save_secrets { r.secret.as_str() } else { "" };
        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{:.4}\n",
            run_id,
            r.game_id,
            r.seed,
            secret,
            r.target,
            r.outcome.label(),
            r.guess_count(),
            r.eval_failures(),
            r.elapsed_seconds
        ));
    }
    output
}

/// Guess-level table with feedback encoded as `G`/`Y`/`X`.
#[must_use]
pub fn format_guesses_csv(run_id: &str, reports: &[GameReport]) -> String {
    let mut output = String::new();
    output.push_str(
        "run_id,game_id,guess_index,guess,feedback,fitness,generations,eval_failures,runtime_s\n",
    );
    for r in reports {
        for g in &r.guesses {
            output.push_str(&format!(
                "{},{},{},{},{},{:.6},{},{},{:.4}\n",
                run_id,
                r.game_id,
                g.guess_index,
                g.guess,
                g.feedback,
                g.fitness,
                g.generations,
                g.eval_failures,
                g.elapsed_seconds
            ));
        }
    }
    output
}

/// Generation-level table.
#[must_use]
pub fn format_generations_csv(run_id: &str, reports: &[GameReport]) -> String {
    let mut output = String::new();
    output.push_str(
        "run_id,game_id,guess_index,generation,best_fitness,mean_fitness,min_fitness,std_fitness,\
         eval_failures,grammar_rejections,runtime_s\n",
    );
    for r in reports {
        for s in &r.generations {
            output.push_str(&format!(
                "{},{},{},{},{:.6},{:.6},{:.6},{:.6},{},{},{:.4}\n",
                run_id,
                r.game_id,
                s.guess_index,
                s.generation,
                s.fitness.best,
                s.fitness.mean,
                s.fitness.worst,
                s.fitness.std,
                s.eval_failures,
                s.grammar_rejections,
                s.elapsed_seconds
            ));
        }
    }
    output
}

/// Directory name for a run started at `timestamp` (seconds since the epoch).
///
/// Characters outside `[A-Za-z0-9_-]` in the tag are replaced by `_`.
#[must_use]
pub fn run_dir_name(prefix: &str, timestamp: u64, tag: Option<&str>) -> String {
    match tag.filter(|t| !t.is_empty()) {
        Some(tag) => {
            let clean: String = tag
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
                .collect();
            format!("{prefix}_{timestamp}_{clean}")
        }
        None => format!("{prefix}_{timestamp}"),
    }
}

/// Seconds since the Unix epoch, or 0 if the clock is before it.
#[must_use]
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Create `<out>/<name>/`, failing if it already exists.
///
/// # Errors
///
/// [`BenchmarkError::Io`] if the directory cannot be created.
pub fn create_run_dir(out: &Path, name: &str) -> Result<PathBuf, BenchmarkError> {
    fs::create_dir_all(out).map_err(|source| BenchmarkError::Io {
        path: out.to_path_buf(),
        source,
    })?;
    let dir = out.join(name);
    fs::create_dir(&dir).map_err(|source| BenchmarkError::Io {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}

/// Write `contents` to `path`.
///
/// # Errors
///
/// [`BenchmarkError::Io`] on failure.
pub fn write_file(path: &Path, contents: &str) -> Result<(), BenchmarkError> {
    fs::write(path, contents).map_err(|source| BenchmarkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the three tables and `config.json` into `dir`, using the
/// directory name as run id.
///
/// # Errors
///
/// [`BenchmarkError`] if any file cannot be written.
pub fn write_run(
    dir: &Path,
    config: &Configuration,
    reports: &[GameReport],
    save_secrets: bool,
) -> Result<(), BenchmarkError> {
    let run_id = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    write_file(&dir.join("games.csv"), &format_games_csv(&run_id, reports, save_secrets))?;
    write_file(&dir.join("guesses.csv"), &format_guesses_csv(&run_id, reports))?;
    write_file(&dir.join("generations.csv"), &format_generations_csv(&run_id, reports))?;
    write_file(&dir.join("config.json"), &config.to_json()?)?;

    info!(dir = %dir.display(), games = reports.len(), "benchmark tables written");
    Ok(())
}
