//! Grammar-constrained evolutionary search for the next guess.
//!
//! Each guess cycle runs a small genetic algorithm over expressions of the
//! game's length:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Seed from Language::derivations             │
//! ├─────────────────────────────────────────────┤
//! │ Fitness against the ConstraintSet           │
//! ├─────────────────────────────────────────────┤
//! │ Selection │ Crossover │ Mutation │ Elitism  │
//! ├─────────────────────────────────────────────┤
//! │ Emit the best candidate on the target value │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every population member is derivable from the grammar. Offspring the
//! grammar rejects are replaced by a parent clone (crossover) or by the
//! unmutated child (mutation). Members whose evaluation fails stay in the
//! population at [`MIN_FITNESS`] and are counted, but are never selected.

mod crossover;
mod evolution;
mod fitness;
mod mutation;
mod selection;

pub use evolution::{SearchOutcome, Searcher};
pub use fitness::MIN_FITNESS;

use crate::error::EvalError;
use crate::eval::{evaluate, Value};
use crate::expression::Expression;

/// A grammar-valid population member, evaluable or not.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    text: String,
    chars: Vec<char>,
    value: Result<Value, EvalError>,
}

impl Candidate {
    /// Evaluate derivable text.
    fn from_chars(chars: Vec<char>) -> Self {
        let text: String = chars.iter().collect();
        let value = evaluate(&text);
        Self { text, chars, value }
    }

    #[cfg(test)]
    fn from_text(text: String) -> Self {
        let chars = text.chars().collect();
        let value = evaluate(&text);
        Self { text, chars, value }
    }

    #[cfg(test)]
    fn from_expression(expression: &Expression) -> Self {
        Self {
            text: expression.as_str().to_string(),
            chars: expression.chars().to_vec(),
            value: Ok(expression.value()),
        }
    }

    /// Whether evaluation succeeded.
    fn is_fit(&self) -> bool {
        self.value.is_ok()
    }

    fn into_expression(self) -> Option<Expression> {
        let value = self.value.ok()?;
        Some(Expression::from_parts(self.text, self.chars, value))
    }
}
