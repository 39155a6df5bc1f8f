//! Check command implementation.

use super::CliError;
use mathler::{evaluate, Grammar, GrammarError};
use std::path::Path;

/// Execute the check command.
///
/// Prints the expression's value and whether the grammar derives it.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded or the expression is not
/// a valid guess.
pub(crate) fn execute(expression: &str, grammar: Option<&Path>) -> Result<(), CliError> {
    let grammar = match grammar {
        Some(path) => Grammar::from_file(path)?,
        None => Grammar::mathler()?,
    };

    let value = evaluate(expression);
    match &value {
        Ok(v) => println!("Value: {v}"),
        Err(e) => println!("Value: {e}"),
    }

    let derivable = match grammar.language(expression.chars().count()) {
        Ok(language) => language.validate(expression),
        Err(GrammarError::NoStringsOfLength { .. } | GrammarError::LengthOutOfRange(_)) => false,
        Err(e) => return Err(e.into()),
    };
    println!("Grammar: {}", if derivable { "derivable" } else { "not derivable" });

    if derivable && value.is_ok() {
        println!("Valid guess");
        Ok(())
    } else {
        Err(CliError::new(format!("{expression:?} is not a valid guess")))
    }
}
