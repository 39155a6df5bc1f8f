//! Validated fixed-length expressions.

use crate::error::ExpressionError;
use crate::eval::{evaluate, Value};
use crate::grammar::Language;
use serde::Serialize;
use std::fmt;

/// A terminal string of the language's length that is derivable from the
/// grammar and evaluates to a defined value.
///
/// Never mutated; search operators build new instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Expression {
    text: String,
    #[serde(skip)]
    chars: Vec<char>,
    #[serde(skip)]
    value: Value,
}

impl Expression {
    /// Validate `text` against `language` and evaluate it.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError`] if the length is wrong, the text is not
    /// derivable, or evaluation fails.
    pub fn new(language: &Language, text: &str) -> Result<Self, ExpressionError> {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() != language.length() {
            return Err(ExpressionError::Length {
                text: text.to_string(),
                actual: chars.len(),
                expected: language.length(),
            });
        }
        if !language.recognize(&chars) {
            return Err(ExpressionError::NotDerivable(text.to_string()));
        }
        let value = evaluate(text).map_err(|source| ExpressionError::Eval {
            text: text.to_string(),
            source,
        })?;
        Ok(Self {
            text: text.to_string(),
            chars,
            value,
        })
    }

    /// Wrap text the caller has already validated and evaluated.
    pub(crate) fn from_parts(text: String, chars: Vec<char>, value: Value) -> Self {
        Self { text, chars, value }
    }

    /// The expression text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The expression as characters.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The evaluated value.
    #[must_use]
    pub fn value(&self) -> Value {
        self.value
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false for a constructed expression; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Expression {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    fn language() -> Language {
        Grammar::mathler().unwrap().language(6).unwrap()
    }

    #[test]
    fn test_valid_expression() {
        let expr = Expression::new(&language(), "12+3*4").unwrap();
        assert_eq!(expr.as_str(), "12+3*4");
        assert_eq!(expr.value(), Value::integer(24));
        assert_eq!(expr.len(), 6);
    }

    #[test]
    fn test_rejections() {
        let language = language();
        assert!(matches!(
            Expression::new(&language, "2+3*4"),
            Err(ExpressionError::Length { actual: 5, expected: 6, .. })
        ));
        assert!(matches!(
            Expression::new(&language, "12**34"),
            Err(ExpressionError::NotDerivable(_))
        ));
    }

    #[test]
    fn test_derivable_but_not_evaluable() {
        let grammar = Grammar::parse("%start <e>\n<e> ::= <d> \"/\" <d>\n<d> ::= \"0\" | \"1\"\n").unwrap();
        let language = grammar.language(3).unwrap();
        assert!(matches!(
            Expression::new(&language, "1/0"),
            Err(ExpressionError::Eval { .. })
        ));
        assert!(Expression::new(&language, "0/1").is_ok());
    }
}
