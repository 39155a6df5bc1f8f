//! CLI command implementations for Mathler.

pub(crate) mod autotune;
pub(crate) mod benchmark;
pub(crate) mod check;
pub(crate) mod demo;

mod output;

use indicatif::{ProgressBar, ProgressStyle};
use mathler::{
    BenchmarkError, ConfigError, Configuration, ExpressionError, Grammar, GrammarError, Language,
    SearchError,
};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<GrammarError> for CliError {
    fn from(e: GrammarError) -> Self {
        Self::new(format!("grammar: {e}"))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(format!("configuration: {e}"))
    }
}

impl From<ExpressionError> for CliError {
    fn from(e: ExpressionError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SearchError> for CliError {
    fn from(e: SearchError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<BenchmarkError> for CliError {
    fn from(e: BenchmarkError) -> Self {
        Self::new(format!("writing results: {e}"))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

/// Load the configuration file, or the defaults.
fn load_config(path: Option<&Path>) -> Result<Configuration, CliError> {
    match path {
        Some(path) => Ok(Configuration::from_json_file(path)?),
        None => Ok(Configuration::default()),
    }
}

/// Load the grammar file, or the built-in grammar, restricted to `length`.
fn load_language(path: Option<&Path>, length: usize) -> Result<Language, CliError> {
    let grammar = match path {
        Some(path) => Grammar::from_file(path)?,
        None => Grammar::mathler()?,
    };
    Ok(grammar.language(length)?)
}

/// Size the global rayon pool.
fn configure_threads(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }
}

/// Progress bar counting `len` items named `unit`, if enabled.
fn progress_bar(enabled: bool, len: usize, unit: &str) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let template = format!(
        "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{per_sec}})"
    );
    let style = ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    let pb = ProgressBar::new(len as u64);
    pb.set_style(style);
    Some(pb)
}
