//! Instrumentation emitted by the search engine and the game loop.
//!
//! The core reports through [`SearchObserver`]; the benchmark runner and the
//! autotuner collect the records with a [`Recorder`] and turn them into
//! tables.

// Statistics use intentional casts
#![allow(clippy::cast_precision_loss)]

use crate::feedback::Feedback;
use serde::Serialize;

/// Summary statistics of one generation's fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitnessStats {
    /// Mean fitness of the population.
    pub mean: f64,
    /// Best fitness in the population.
    pub best: f64,
    /// Worst fitness in the population.
    pub worst: f64,
    /// Standard deviation of fitness.
    pub std: f64,
}

impl FitnessStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                mean: 0.0,
                best: 0.0,
                worst: 0.0,
                std: 0.0,
            };
        }

        let n = fitness.len() as f64;
        let mean = fitness.iter().sum::<f64>() / n;
        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitness.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            best,
            worst,
            std: variance.sqrt(),
        }
    }
}

/// One generation of one guess cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// 1-based guess number within the game.
    pub guess_index: usize,
    /// 0-based generation within the guess cycle.
    pub generation: usize,
    /// Fitness summary over the whole population.
    pub fitness: FitnessStats,
    /// Population members whose evaluation failed.
    pub eval_failures: usize,
    /// Offspring rejected by the grammar and replaced this generation.
    pub grammar_rejections: usize,
    /// Wall time spent on this generation.
    pub elapsed_seconds: f64,
}

/// One guess and how it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuessRecord {
    /// 1-based guess number within the game.
    pub guess_index: usize,
    /// The guessed expression.
    pub guess: String,
    /// Marks returned for it.
    pub feedback: Feedback,
    /// Fitness of the guess when it was emitted.
    pub fitness: f64,
    /// Generations evolved for this guess.
    pub generations: usize,
    /// Evaluation failures seen across the cycle.
    pub eval_failures: usize,
    /// Wall time of the guess cycle.
    pub elapsed_seconds: f64,
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    /// The secret was guessed.
    Won,
    /// Guesses ran out.
    Lost,
    /// The search could not produce a guess.
    Aborted,
}

impl Outcome {
    /// Lower-case label used in tables.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Aborted => "aborted",
        }
    }
}

/// Everything recorded about one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameReport {
    /// Index of the game within its run.
    pub game_id: usize,
    /// Seed the game's random streams were derived from.
    pub seed: u64,
    /// The secret expression.
    pub secret: String,
    /// The secret's value as displayed.
    pub target: String,
    /// How the game ended.
    pub outcome: Outcome,
    /// Per-guess records, in order.
    pub guesses: Vec<GuessRecord>,
    /// Per-generation records for all guesses, in order.
    pub generations: Vec<GenerationStats>,
    /// Wall time of the whole game.
    pub elapsed_seconds: f64,
}

impl GameReport {
    /// Number of guesses made.
    #[must_use]
    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }

    /// Evaluation failures across every generation of the game.
    #[must_use]
    pub fn eval_failures(&self) -> usize {
        self.guesses.iter().map(|g| g.eval_failures).sum()
    }
}

/// Hooks called by the search engine and the game loop.
pub trait SearchObserver {
    /// Called after each generation is scored.
    fn on_generation(&mut self, _stats: &GenerationStats) {}

    /// Called once a guess has received feedback.
    fn on_guess(&mut self, _record: &GuessRecord) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Observer that keeps every record.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    /// Generations seen so far.
    pub generations: Vec<GenerationStats>,
    /// Guesses seen so far.
    pub guesses: Vec<GuessRecord>,
}

impl SearchObserver for Recorder {
    fn on_generation(&mut self, stats: &GenerationStats) {
        self.generations.push(*stats);
    }

    fn on_guess(&mut self, record: &GuessRecord) {
        self.guesses.push(record.clone());
    }
}
