//! Random-search autotuning of search parameters and fitness weights.
//!
//! Each trial samples a configuration uniformly from [`ParameterRanges`],
//! plays a fixed number of games with it, and is scored as
//! `100 * win_rate - 3 * mean_guesses`. Every trial is kept so the choice of
//! winner can be audited, and every trial is reproducible from its seed.

// Sampling and statistics use intentional casts
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use crate::benchmark::{charged_guesses, mean, median, write_file, FAILED_GAME_PENALTY};
use crate::config::{Configuration, FitnessWeights, SearchConfig};
use crate::error::{BenchmarkError, ConfigError};
use crate::game::run_game;
use crate::grammar::Language;
use crate::metrics::Outcome;
use crate::rng::{derive_seed, stream_rng, TUNING_STREAM};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Weight of the win rate (in percent) in a trial's score.
const WIN_RATE_WEIGHT: f64 = 100.0;

/// Penalty per mean guess in a trial's score.
const GUESS_WEIGHT: f64 = 3.0;

/// Inclusive bounds for one sampled parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    /// Lower bound.
    pub min: T,
    /// Upper bound.
    pub max: T,
}

impl<T> Bounds<T> {
    /// Bounds from `min` to `max` inclusive.
    #[must_use]
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl Bounds<usize> {
    fn sample<R: Rng>(self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max)
    }
}

impl Bounds<f64> {
    fn sample<R: Rng>(self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

/// Space of sampled search parameters and fitness weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterRanges {
    /// Population size.
    pub population_size: Bounds<usize>,
    /// Generations per guess.
    pub generations_per_guess: Bounds<usize>,
    /// Per-position mutation probability.
    pub mutation_rate: Bounds<f64>,
    /// Crossover probability.
    pub crossover_rate: Bounds<f64>,
    /// Elites as a fraction of the population.
    pub elite_fraction: Bounds<f64>,
    /// Tournament size.
    pub tournament_size: Bounds<usize>,
    /// Weight of the target-value term.
    pub value_weight: Bounds<f64>,
    /// Weight of the exact-position term.
    pub exact_weight: Bounds<f64>,
    /// Weight of the character-count term.
    pub counts_weight: Bounds<f64>,
    /// Weight of the per-position exclusion term.
    pub exclusions_weight: Bounds<f64>,
    /// Weight of the history-agreement term.
    pub history_weight: Bounds<f64>,
    /// Accepted distance from the revealed target. Only sampled when the
    /// base configuration enforces a tolerance.
    pub value_tolerance: Bounds<f64>,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            population_size: Bounds::new(300, 1500),
            generations_per_guess: Bounds::new(10, 50),
            mutation_rate: Bounds::new(0.01, 0.3),
            crossover_rate: Bounds::new(0.35, 1.0),
            elite_fraction: Bounds::new(0.01, 0.15),
            tournament_size: Bounds::new(2, 6),
            value_weight: Bounds::new(0.5, 4.0),
            exact_weight: Bounds::new(0.25, 2.0),
            counts_weight: Bounds::new(0.25, 2.0),
            exclusions_weight: Bounds::new(0.1, 2.0),
            history_weight: Bounds::new(1.0, 8.0),
            value_tolerance: Bounds::new(0.0, 10.0),
        }
    }
}

impl ParameterRanges {
    /// Check that every range is ordered and samples valid values.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvertedRange`] for reversed bounds, or the error of a
    /// bound that no configuration would accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("population_size", self.population_size),
            ("generations_per_guess", self.generations_per_guess),
            ("tournament_size", self.tournament_size),
        ];
        for (name, b) in counts {
            if b.min > b.max {
                return Err(ConfigError::InvertedRange(name));
            }
        }
        let rates = [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
            ("elite_fraction", self.elite_fraction),
        ];
        for (name, b) in rates {
            if !(0.0..=1.0).contains(&b.min) {
                return Err(ConfigError::NotProbability { name, value: b.min });
            }
            if !(0.0..=1.0).contains(&b.max) {
                return Err(ConfigError::NotProbability { name, value: b.max });
            }
            if b.min > b.max {
                return Err(ConfigError::InvertedRange(name));
            }
        }
        let weights = [
            ("value_weight", self.value_weight),
            ("exact_weight", self.exact_weight),
            ("counts_weight", self.counts_weight),
            ("exclusions_weight", self.exclusions_weight),
            ("history_weight", self.history_weight),
            ("value_tolerance", self.value_tolerance),
        ];
        for (name, b) in weights {
            for value in [b.min, b.max] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::BadWeight { name, value });
                }
            }
            if b.min > b.max {
                return Err(ConfigError::InvertedRange(name));
            }
        }
        if self.population_size.min < 2 {
            return Err(ConfigError::TooSmall {
                name: "population_size",
                min: 2,
                value: self.population_size.min,
            });
        }
        Ok(())
    }

    /// Sample a configuration, keeping game rules and unsampled search
    /// parameters from `base`.
    ///
    /// Fitness weights are drawn after the search parameters, so adding
    /// them did not move any earlier draw.
    ///
    /// # Errors
    ///
    /// Range errors from [`ParameterRanges::validate`], or
    /// [`Configuration::new`] validation errors.
    pub fn sample<R: Rng>(
        &self,
        base: &Configuration,
        seed: u64,
        rng: &mut R,
    ) -> Result<Configuration, ConfigError> {
        self.validate()?;
        let population_size = self.population_size.sample(rng);
        let generations_per_guess = self.generations_per_guess.sample(rng);
        let mutation_rate = self.mutation_rate.sample(rng);
        let crossover_rate = self.crossover_rate.sample(rng);
        let elite_fraction = self.elite_fraction.sample(rng);
        let tournament_size = self.tournament_size.sample(rng);
        let fitness = FitnessWeights {
            value: self.value_weight.sample(rng),
            exact: self.exact_weight.sample(rng),
            counts: self.counts_weight.sample(rng),
            exclusions: self.exclusions_weight.sample(rng),
            history: self.history_weight.sample(rng),
            value_tolerance: {
                let tolerance = self.value_tolerance.sample(rng);
                base.fitness().value_tolerance.map(|_| tolerance)
            },
        };

        let elitism_count = ((population_size as f64 * elite_fraction).round() as usize)
            .clamp(1, population_size - 1);
        let search = SearchConfig {
            population_size,
            generations_per_guess,
            mutation_rate,
            crossover_rate,
            elitism_count,
            tournament_size,
            carry_over: base.search().carry_over.min(population_size),
            seed,
            ..*base.search()
        };
        Configuration::new(search, fitness, *base.game())
    }
}

/// Autotuner settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Configurations sampled.
    pub trials: usize,
    /// Games played per configuration.
    pub games_per_trial: usize,
    /// Seed all trial seeds derive from.
    pub seed: u64,
    /// Sampled parameter space.
    pub ranges: ParameterRanges,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            trials: 200,
            games_per_trial: 20,
            seed: 42,
            ranges: ParameterRanges::default(),
        }
    }
}

impl TunerConfig {
    /// Check counts and ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for zero counts or invalid ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::TooSmall {
                name: "trials",
                min: 1,
                value: 0,
            });
        }
        if self.games_per_trial == 0 {
            return Err(ConfigError::TooSmall {
                name: "games_per_trial",
                min: 1,
                value: 0,
            });
        }
        self.ranges.validate()
    }
}

/// Result of one sampled configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialRecord {
    /// Index of the trial within the run.
    pub trial_id: usize,
    /// Seed the configuration was sampled from; game seeds derive from it.
    pub seed: u64,
    /// The sampled configuration.
    pub config: Configuration,
    /// Games played.
    pub games: usize,
    /// Games won.
    pub wins: usize,
    /// Fraction of games won.
    pub win_rate: f64,
    /// Mean guesses with unwon games charged as failures.
    pub mean_guesses: f64,
    /// Median of the same counts.
    pub median_guesses: f64,
    /// `100 * win_rate - 3 * mean_guesses`.
    pub score: f64,
    /// Wall time of the trial.
    pub elapsed_seconds: f64,
}

/// All trials of a run and the winner.
#[derive(Debug, Clone)]
pub struct TuneReport {
    /// Every trial, ordered by id.
    pub trials: Vec<TrialRecord>,
    /// Index into `trials` of the selected trial.
    pub best: usize,
}

impl TuneReport {
    /// The selected trial.
    #[must_use]
    pub fn best(&self) -> &TrialRecord {
        &self.trials[self.best]
    }
}

/// Trial score from win rate and mean guesses.
#[must_use]
pub fn trial_score(win_rate: f64, mean_guesses: f64) -> f64 {
    WIN_RATE_WEIGHT * win_rate - GUESS_WEIGHT * mean_guesses
}

/// Order trials best first: higher score, then fewer mean guesses, then
/// earlier id.
#[must_use]
pub fn compare_trials(a: &TrialRecord, b: &TrialRecord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.mean_guesses.total_cmp(&b.mean_guesses))
        .then_with(|| a.trial_id.cmp(&b.trial_id))
}

/// Index of the best trial, if any.
#[must_use]
pub fn select_best(trials: &[TrialRecord]) -> Option<usize> {
    (0..trials.len()).min_by(|&a, &b| compare_trials(&trials[a], &trials[b]))
}

/// Play `games` games with `config`, seeding each from `seed`.
#[must_use]
pub fn run_trial(
    language: &Language,
    trial_id: usize,
    seed: u64,
    config: Configuration,
    games: usize,
) -> TrialRecord {
    let started = Instant::now();
    let max_guesses = config.game().max_guesses;
    let mut wins = 0;
    let mut charged = Vec::with_capacity(games);

    for game_id in 0..games {
        let game_seed = derive_seed(seed, game_id as u64);
        match run_game(language, &config, game_id, game_seed, None) {
            Ok(report) => {
                if report.outcome == Outcome::Won {
                    wins += 1;
                }
                charged.push(charged_guesses(&report, max_guesses));
            }
            Err(e) => {
                warn!(trial_id, game_id, error = %e, "no secret could be drawn, charging a loss");
                charged.push(max_guesses + FAILED_GAME_PENALTY);
            }
        }
    }

    let win_rate = if games == 0 { 0.0 } else { wins as f64 / games as f64 };
    let mean_guesses = mean(&charged);
    let record = TrialRecord {
        trial_id,
        seed,
        config,
        games,
        wins,
        win_rate,
        mean_guesses,
        median_guesses: median(&charged),
        score: trial_score(win_rate, mean_guesses),
        elapsed_seconds: started.elapsed().as_secs_f64(),
    };
    info!(
        trial_id,
        score = record.score,
        win_rate,
        mean_guesses,
        population = config.search().population_size,
        "trial finished"
    );
    record
}

/// Sample the configuration of trial `trial_id`.
///
/// # Errors
///
/// Propagates sampling validation errors.
pub fn sample_trial(
    tuner: &TunerConfig,
    base: &Configuration,
    trial_id: usize,
) -> Result<(u64, Configuration), ConfigError> {
    let seed = derive_seed(tuner.seed, trial_id as u64);
    let mut rng = stream_rng(seed, TUNING_STREAM);
    let config = tuner.ranges.sample(base, seed, &mut rng)?;
    Ok((seed, config))
}

/// Run every trial in parallel and pick the winner.
///
/// `on_done` is called as each trial finishes. Returns `Ok(None)` if every
/// trial was skipped.
///
/// # Errors
///
/// [`ConfigError`] if `tuner` is invalid.
pub fn autotune<F>(
    language: &Language,
    base: &Configuration,
    tuner: &TunerConfig,
    on_done: F,
) -> Result<Option<TuneReport>, ConfigError>
where
    F: Fn(&TrialRecord) + Sync,
{
    tuner.validate()?;

    let mut trials: Vec<TrialRecord> = (0..tuner.trials)
        .into_par_iter()
        .filter_map(|trial_id| match sample_trial(tuner, base, trial_id) {
            Ok((seed, config)) => {
                let record = run_trial(language, trial_id, seed, config, tuner.games_per_trial);
                on_done(&record);
                Some(record)
            }
            Err(e) => {
                warn!(trial_id, error = %e, "sampled configuration rejected, skipping trial");
                None
            }
        })
        .collect();
    trials.sort_by_key(|t| t.trial_id);

    Ok(select_best(&trials).map(|best| TuneReport { trials, best }))
}

/// One row per trial with the sampled parameters flattened.
#[must_use]
pub fn format_trials_csv(trials: &[TrialRecord]) -> String {
    let mut output = String::new();
    output.push_str(
        "trial_id,seed,population_size,generations_per_guess,mutation_rate,crossover_rate,\
         crossover_points,elitism_count,tournament_size,carry_over,fit_value,fit_exact,\
         fit_counts,fit_exclusions,fit_history,fit_value_tolerance,games,wins,win_rate,\
         mean_guesses,median_guesses,score,runtime_s\n",
    );
    for t in trials {
        let s = t.config.search();
        let f = t.config.fitness();
        let tolerance = f
            .value_tolerance
            .map_or_else(String::new, |v| format!("{v:.4}"));
        output.push_str(&format!(
            "{},{},{},{},{:.4},{:.4},{},{},{},{},{:.4},{:.4},{:.4},{:.4},{:.4},{},{},{},{:.4},{:.4},{:.1},{:.4},{:.2}\n",
            t.trial_id,
            t.seed,
            s.population_size,
            s.generations_per_guess,
            s.mutation_rate,
            s.crossover_rate,
            s.crossover_points,
            s.elitism_count,
            s.tournament_size,
            s.carry_over,
            f.value,
            f.exact,
            f.counts,
            f.exclusions,
            f.history,
            tolerance,
            t.games,
            t.wins,
            t.win_rate,
            t.mean_guesses,
            t.median_guesses,
            t.score,
            t.elapsed_seconds
        ));
    }
    output
}

/// Write `trials.csv` and `best_config.json` into `dir`.
///
/// # Errors
///
/// [`BenchmarkError`] if either file cannot be written.
pub fn write_tune_run(dir: &Path, report: &TuneReport) -> Result<(), BenchmarkError> {
    write_file(&dir.join("trials.csv"), &format_trials_csv(&report.trials))?;
    write_file(&dir.join("best_config.json"), &report.best().config.to_json()?)?;
    info!(dir = %dir.display(), trials = report.trials.len(), "tuning results written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(trial_id: usize, score: f64, mean_guesses: f64) -> TrialRecord {
        TrialRecord {
            trial_id,
            seed: 0,
            config: Configuration::default(),
            games: 1,
            wins: 1,
            win_rate: 1.0,
            mean_guesses,
            median_guesses: mean_guesses,
            score,
            elapsed_seconds: 0.0,
        }
    }

    #[test]
    fn test_score_formula() {
        assert!((trial_score(0.5, 4.0) - 38.0).abs() < 1e-9);
        assert!((trial_score(0.0, 10.0) + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_best_tie_breaks() {
        let trials = vec![
            record(0, 70.0, 5.0),
            record(1, 80.0, 6.0),
            record(2, 80.0, 4.0),
            record(3, 80.0, 4.0),
        ];
        assert_eq!(select_best(&trials), Some(2));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_sample_within_ranges() {
        let tuner = TunerConfig::default();
        let base = Configuration::default();
        for trial_id in 0..20 {
            let (seed, config) = sample_trial(&tuner, &base, trial_id).unwrap();
            let s = config.search();
            assert_eq!(s.seed, seed);
            assert!((300..=1500).contains(&s.population_size));
            assert!((10..=50).contains(&s.generations_per_guess));
            assert!((2..=6).contains(&s.tournament_size));
            assert!((0.01..=0.3).contains(&s.mutation_rate));
            assert!(s.elitism_count >= 1 && s.elitism_count < s.population_size);
        }
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let tuner = TunerConfig::default();
        let base = Configuration::default();
        assert_eq!(
            sample_trial(&tuner, &base, 7).unwrap(),
            sample_trial(&tuner, &base, 7).unwrap()
        );
        assert_ne!(
            sample_trial(&tuner, &base, 7).unwrap().0,
            sample_trial(&tuner, &base, 8).unwrap().0
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut tuner = TunerConfig::default();
        tuner.ranges.tournament_size = Bounds::new(5, 2);
        assert_eq!(tuner.validate(), Err(ConfigError::InvertedRange("tournament_size")));
        tuner.ranges.tournament_size = Bounds::new(2, 5);
        tuner.trials = 0;
        assert!(matches!(tuner.validate(), Err(ConfigError::TooSmall { name: "trials", .. })));
    }

    #[test]
    fn test_trials_csv_flattens_config() {
        let csv = format_trials_csv(&[record(4, 12.5, 5.0)]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(
            "4,0,1000,20,0.1000,0.9000,1,100,4,0,2.0000,1.0000,1.0000,1.0000,4.0000,0.0000,\
             1,1,1.0000,5.0000,5.0,12.5000,"
        ));
        assert_eq!(csv.lines().next().unwrap().split(',').count(), row.split(',').count());
    }

    #[test]
    fn test_sampled_fitness_within_ranges() {
        let tuner = TunerConfig::default();
        let base = Configuration::default();
        let r = tuner.ranges;
        let within = |b: Bounds<f64>, v: f64| (b.min..=b.max).contains(&v);
        let mut weights = Vec::new();
        for trial_id in 0..20 {
            let (_, config) = sample_trial(&tuner, &base, trial_id).unwrap();
            let f = *config.fitness();
            assert!(within(r.value_weight, f.value));
            assert!(within(r.exact_weight, f.exact));
            assert!(within(r.counts_weight, f.counts));
            assert!(within(r.exclusions_weight, f.exclusions));
            assert!(within(r.history_weight, f.history));
            assert!(within(r.value_tolerance, f.value_tolerance.unwrap()));
            weights.push(f);
        }
        // The weights are sampled, not copied from the base
        assert!(weights.iter().any(|f| *f != *base.fitness()));
    }

    #[test]
    fn test_disabled_tolerance_stays_disabled() {
        let tuner = TunerConfig::default();
        let fitness = FitnessWeights {
            value_tolerance: None,
            ..FitnessWeights::default()
        };
        let base =
            Configuration::new(SearchConfig::default(), fitness, crate::config::GameConfig::default())
                .unwrap();
        let (_, config) = sample_trial(&tuner, &base, 3).unwrap();
        assert_eq!(config.fitness().value_tolerance, None);
    }

    #[test]
    fn test_bad_weight_range_rejected() {
        let mut ranges = ParameterRanges::default();
        ranges.history_weight = Bounds::new(4.0, 1.0);
        assert_eq!(ranges.validate(), Err(ConfigError::InvertedRange("history_weight")));
        ranges.history_weight = Bounds::new(1.0, 4.0);
        ranges.value_tolerance = Bounds::new(-1.0, 4.0);
        assert!(matches!(
            ranges.validate(),
            Err(ConfigError::BadWeight { name: "value_tolerance", .. })
        ));
    }
}
