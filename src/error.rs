//! Error taxonomy for the solver.
//!
//! Grammar and configuration errors are fatal before any game starts.
//! Evaluation errors are per-candidate and recovered by the fitness function.
//! Search exhaustion is fatal for one game but never for a batch.

use std::path::PathBuf;
use thiserror::Error;

/// A grammar failed to load or cannot produce strings of the requested length.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A line of the BNF source could not be parsed.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line number in the source.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// The grammar has no start symbol and no `<expr6>` fallback.
    #[error("no %start directive and no <expr6> non-terminal")]
    MissingStart,
    /// A non-terminal is referenced but never defined.
    #[error("non-terminal {0} is used but never defined")]
    Undefined(String),
    /// The start symbol cannot derive any string of the target length.
    #[error("start symbol {start} derives no strings of length {length}")]
    NoStringsOfLength {
        /// Name of the start symbol.
        start: String,
        /// Requested expression length.
        length: usize,
    },
    /// The target length exceeds what the length tables can represent.
    #[error("expression length {0} is outside the supported range 1..={max}", max = crate::grammar::MAX_LENGTH)]
    LengthOutOfRange(usize),
    /// The grammar uses more distinct terminal characters than supported.
    #[error("grammar uses {0} distinct terminal characters (max {max})", max = crate::grammar::MAX_ALPHABET)]
    AlphabetTooLarge(usize),
    /// Reading the grammar file failed.
    #[error("failed to read grammar: {0}")]
    Io(String),
}

/// Why an expression could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The text is not an arithmetic expression.
    #[error("syntax invalid at offset {offset}: {reason}")]
    SyntaxInvalid {
        /// Character offset where parsing failed.
        offset: usize,
        /// Short description of the failure.
        reason: &'static str,
    },
    /// The expression parses but its value is undefined.
    #[error("arithmetic invalid: {0}")]
    ArithmeticInvalid(ArithmeticFault),
}

/// Arithmetic failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticFault {
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// An intermediate value left the `i64` range.
    #[error("overflow")]
    Overflow,
}

/// A string could not be accepted as an [`Expression`](crate::Expression).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// Wrong number of characters.
    #[error("expression {text:?} has length {actual}, expected {expected}")]
    Length {
        /// The rejected text.
        text: String,
        /// Its character count.
        actual: usize,
        /// The language's fixed length.
        expected: usize,
    },
    /// Not derivable from the grammar's start symbol.
    #[error("expression {0:?} is not derivable from the grammar")]
    NotDerivable(String),
    /// Derivable but not evaluable.
    #[error("expression {text:?} cannot be evaluated: {source}")]
    Eval {
        /// The rejected text.
        text: String,
        /// The evaluator's verdict.
        source: EvalError,
    },
}

/// A configuration parameter is out of range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A count parameter must be at least `min`.
    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        /// Parameter name.
        name: &'static str,
        /// Smallest accepted value.
        min: usize,
        /// Supplied value.
        value: usize,
    },
    /// A probability is outside `[0, 1]` or not finite.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    NotProbability {
        /// Parameter name.
        name: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// A weight is negative or not finite.
    #[error("{name} must be a finite non-negative weight, got {value}")]
    BadWeight {
        /// Parameter name.
        name: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// Two parameters are inconsistent with each other.
    #[error("{0}")]
    Inconsistent(String),
    /// A tuning range has its bounds reversed.
    #[error("range for {0} has lower bound above upper bound")]
    InvertedRange(&'static str),
    /// Configuration JSON could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// The search engine could not produce a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    /// No grammar-valid, evaluable candidate could be generated.
    #[error("search exhausted: no valid candidate after {attempts} derivation attempts")]
    Exhausted {
        /// How many derivations were tried.
        attempts: usize,
    },

    /// Candidates evaluated, but none came within the value tolerance of
    /// the revealed target.
    #[error("no candidate within the value tolerance of the target ({fit} fit candidates)")]
    OffTarget {
        /// Fit candidates in the final generation.
        fit: usize,
    },
}

/// A guess was submitted to a game that no longer accepts guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// The game already reached Won or Lost.
    #[error("game is already over")]
    Finished,
}

/// Writing benchmark or tuning output failed.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// Filesystem access failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// File or directory being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// JSON serialisation failed.
    #[error("failed to serialise output: {0}")]
    Json(#[from] serde_json::Error),
}
