// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Mathler: a grammar-constrained evolutionary solver for arithmetic Wordle.
//!
//! Secrets are fixed-length arithmetic expressions such as `12+3*4`. Each
//! guess gets per-character feedback (Exact, Present, Absent), and the solver
//! must find the secret within a limited number of guesses. Every guess is
//! derivable from a context-free grammar and evaluates without error.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │    Benchmark Runner │ Autotuner     │
//! ├─────────────────────────────────────┤
//! │         Game Loop                   │
//! ├─────────────────────────────────────┤
//! │  Search Engine │ Constraint Set     │
//! ├─────────────────────────────────────┤
//! │  Grammar │ Evaluator │ Feedback     │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use mathler::{run_game, Configuration, FitnessWeights, GameConfig, Grammar, SearchConfig};
//!
//! let search = SearchConfig {
//!     population_size: 100,
//!     elitism_count: 5,
//!     ..SearchConfig::default()
//! };
//! let config = Configuration::new(search, FitnessWeights::default(), GameConfig::default())?;
//! let language = Grammar::mathler()?.language(6)?;
//! let report = run_game(&language, &config, 0, 42, None)?;
//! assert!(report.guess_count() <= 6);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod benchmark;
pub mod config;
pub mod constraints;
pub mod error;
pub mod eval;
pub mod expression;
pub mod feedback;
pub mod game;
pub mod grammar;
pub mod metrics;
pub mod rng;
pub mod search;
pub mod tune;

pub use config::{Configuration, FitnessWeights, GameConfig, SearchConfig};
pub use constraints::{ConstraintSet, Guess};
pub use error::{
    BenchmarkError, ConfigError, EvalError, ExpressionError, GameError, GrammarError, SearchError,
};
pub use eval::{evaluate, Value};
pub use expression::Expression;
pub use feedback::{compare, Feedback, Mark};
pub use game::{run_game, Game, GameState};
pub use grammar::{Grammar, Language};
pub use metrics::{GameReport, GenerationStats, GuessRecord, Outcome, SearchObserver};
pub use search::{SearchOutcome, Searcher};
pub use tune::{ParameterRanges, TrialRecord, TunerConfig};
