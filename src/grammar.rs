//! Context-free grammar model for candidate expressions.
//!
//! A [`Grammar`] is the parsed rule set. A [`Language`] is a grammar cut down
//! to one fixed string length, with the length tables that make exact-length
//! derivation and recognition cheap.
//!
//! # Example
//!
//! ```
//! use mathler::grammar::Grammar;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let language = Grammar::mathler()?.language(6)?;
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let first = language.derivations(&mut rng).next();
//! assert!(first.is_some_and(|text| language.validate(&text)));
//! # Ok::<(), mathler::GrammarError>(())
//! ```

mod bits;
mod bnf;
mod language;

pub use language::{Derivations, Language};

use crate::error::GrammarError;
use std::path::Path;

/// Longest supported expression, in characters.
pub const MAX_LENGTH: usize = 127;

/// Largest supported terminal alphabet.
pub const MAX_ALPHABET: usize = 128;

/// Source of the built-in six-character grammar.
pub const MATHLER_BNF: &str = include_str!("../grammars/mathler_expr6.bnf");

/// One symbol on the right-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A literal run of characters.
    Terminal(Vec<char>),
    /// Index of a non-terminal in the owning grammar.
    NonTerminal(usize),
}

/// A parsed context-free grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    names: Vec<String>,
    rules: Vec<Vec<Vec<Symbol>>>,
    start: usize,
    alphabet: Vec<char>,
}

impl Grammar {
    /// Parse a grammar from BNF source.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] for malformed lines, undefined
    /// non-terminals, a missing start symbol, or an oversized alphabet.
    pub fn parse(source: &str) -> Result<Self, GrammarError> {
        bnf::parse(source)
    }

    /// Load and parse a grammar file.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::Io`] if the file cannot be read, or any parse error.
    pub fn from_file(path: &Path) -> Result<Self, GrammarError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| GrammarError::Io(format!("{}: {e}", path.display())))?;
        Self::parse(&source)
    }

    /// The built-in six-character arithmetic grammar.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled source is broken.
    pub fn mathler() -> Result<Self, GrammarError> {
        Self::parse(MATHLER_BNF)
    }

    pub(crate) fn from_parts(
        names: Vec<String>,
        rules: Vec<Vec<Vec<Symbol>>>,
        start: usize,
    ) -> Result<Self, GrammarError> {
        let mut alphabet: Vec<char> = rules
            .iter()
            .flatten()
            .flatten()
            .filter_map(|symbol| match symbol {
                Symbol::Terminal(chars) => Some(chars.iter().copied()),
                Symbol::NonTerminal(_) => None,
            })
            .flatten()
            .collect();
        alphabet.sort_unstable();
        alphabet.dedup();
        if alphabet.len() > MAX_ALPHABET {
            return Err(GrammarError::AlphabetTooLarge(alphabet.len()));
        }

        Ok(Self {
            names,
            rules,
            start,
            alphabet,
        })
    }

    /// Restrict this grammar to strings of exactly `length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::NoStringsOfLength`] if the start symbol cannot
    /// derive such a string, or [`GrammarError::LengthOutOfRange`].
    pub fn language(self, length: usize) -> Result<Language, GrammarError> {
        Language::new(self, length)
    }

    /// Index of the start symbol.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Name of a non-terminal, including its angle brackets.
    #[must_use]
    pub fn name(&self, non_terminal: usize) -> &str {
        self.names.get(non_terminal).map_or("<?>", String::as_str)
    }

    /// Number of non-terminals.
    #[must_use]
    pub fn non_terminal_count(&self) -> usize {
        self.rules.len()
    }

    /// Alternatives of a non-terminal.
    #[must_use]
    pub fn alternatives(&self, non_terminal: usize) -> &[Vec<Symbol>] {
        self.rules.get(non_terminal).map_or(&[], Vec::as_slice)
    }

    /// All terminal characters, sorted.
    #[must_use]
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Position of `c` in [`Grammar::alphabet`].
    #[must_use]
    pub fn alphabet_index(&self, c: char) -> Option<usize> {
        self.alphabet.binary_search(&c).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_grammar_parses() {
        let grammar = Grammar::mathler().unwrap();
        assert_eq!(grammar.name(grammar.start()), "<expr6>");
        assert_eq!(grammar.alphabet().len(), 14);
        assert!(grammar.alphabet_index('/').is_some());
        assert!(grammar.alphabet_index('(').is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Grammar::from_file(Path::new("/definitely/not/here.bnf")).unwrap_err();
        assert!(matches!(err, GrammarError::Io(_)));
    }
}
