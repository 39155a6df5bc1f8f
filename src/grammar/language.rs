//! Fixed-length slice of a grammar's language.
//!
//! All tables are computed once by fixpoint iteration bounded by the target
//! length, so unit cycles, epsilon rules, and left recursion are handled
//! without unbounded recursion.

// Length and index arithmetic is bounded by MAX_LENGTH
#![allow(clippy::cast_possible_truncation)]

use super::bits::Bits;
use super::{Grammar, Symbol, MAX_LENGTH};
use crate::error::GrammarError;
use rand::Rng;

/// Expansion steps allowed per output character before a draw is abandoned.
const EXPANSIONS_PER_CHAR: usize = 64;

/// Draws attempted per item before [`Derivations`] gives up.
const DEFAULT_MAX_RETRIES: usize = 256;

/// A grammar restricted to strings of one exact length.
#[derive(Debug, Clone)]
pub struct Language {
    grammar: Grammar,
    length: usize,
    /// Derivable lengths (≤ `length`) per non-terminal.
    lengths: Vec<Bits>,
    /// `suffixes[nt][alt][k]`: derivable lengths of `alt[k..]`.
    suffixes: Vec<Vec<Vec<Bits>>>,
    /// Terminal characters that can occur at each position.
    position_alphabet: Vec<Vec<char>>,
}

/// Pending work on the derivation stack.
enum Pending<'g> {
    Expand { non_terminal: usize, length: usize },
    Emit(&'g [char]),
}

impl Language {
    /// Build the length tables for `grammar` at `length`.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::LengthOutOfRange`] or
    /// [`GrammarError::NoStringsOfLength`].
    pub fn new(grammar: Grammar, length: usize) -> Result<Self, GrammarError> {
        if length == 0 || length > MAX_LENGTH {
            return Err(GrammarError::LengthOutOfRange(length));
        }

        let lengths = derivable_lengths(&grammar, length);
        if !lengths[grammar.start()].contains(length) {
            return Err(GrammarError::NoStringsOfLength {
                start: grammar.name(grammar.start()).to_string(),
                length,
            });
        }

        let suffixes = (0..grammar.non_terminal_count())
            .map(|nt| {
                grammar
                    .alternatives(nt)
                    .iter()
                    .map(|alt| suffix_lengths(alt, &lengths, length))
                    .collect()
            })
            .collect();

        let mut language = Self {
            grammar,
            length,
            lengths,
            suffixes,
            position_alphabet: Vec::new(),
        };
        language.position_alphabet = language.compute_position_alphabet();
        Ok(language)
    }

    /// The underlying grammar.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The fixed string length.
    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Terminal characters that appear at `position` in at least one string.
    #[must_use]
    pub fn alphabet_at(&self, position: usize) -> &[char] {
        self.position_alphabet
            .get(position)
            .map_or(&[], Vec::as_slice)
    }

    /// Lazy stream of random length-exact strings.
    ///
    /// Restart by calling again with a freshly seeded generator.
    pub fn derivations<R: Rng>(&self, rng: R) -> Derivations<'_, R> {
        Derivations {
            language: self,
            rng,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Whether `text` is derivable from the start symbol and has the
    /// language's length.
    #[must_use]
    pub fn validate(&self, text: &str) -> bool {
        let chars: Vec<char> = text.chars().collect();
        self.recognize(&chars)
    }

    /// Character-slice form of [`Language::validate`].
    #[must_use]
    pub fn recognize(&self, s: &[char]) -> bool {
        let n = s.len();
        if n != self.length || s.iter().any(|&c| self.grammar.alphabet_index(c).is_none()) {
            return false;
        }

        let width = n + 1;
        let nts = self.grammar.non_terminal_count();
        // spans[nt * width + i] holds every j where nt derives s[i..j]
        let mut spans = vec![Bits::EMPTY; nts * width];

        for span in 0..=n {
            loop {
                let mut changed = false;
                for nt in 0..nts {
                    if !self.lengths[nt].contains(span) {
                        continue;
                    }
                    for i in 0..=(n - span) {
                        let j = i + span;
                        if spans[nt * width + i].contains(j) {
                            continue;
                        }
                        let derives = self
                            .grammar
                            .alternatives(nt)
                            .iter()
                            .enumerate()
                            .any(|(a, alt)| {
                                self.suffixes[nt][a][0].contains(span)
                                    && matches_sequence(alt, s, i, j, &spans, width)
                            });
                        if derives {
                            spans[nt * width + i].insert(j);
                            changed = true;
                        }
                    }
                }
                if !changed {
                    break;
                }
            }
        }

        spans[self.grammar.start() * width].contains(n)
    }

    /// One random derivation, or `None` if the expansion budget ran out.
    fn derive_once<R: Rng>(&self, rng: &mut R) -> Option<String> {
        let budget = EXPANSIONS_PER_CHAR * (self.length + 1);
        let mut expansions = 0usize;
        let mut out = String::with_capacity(self.length);
        let mut stack = vec![Pending::Expand {
            non_terminal: self.grammar.start(),
            length: self.length,
        }];

        while let Some(item) = stack.pop() {
            let (nt, length) = match item {
                Pending::Emit(chars) => {
                    out.extend(chars);
                    continue;
                }
                Pending::Expand {
                    non_terminal,
                    length,
                } => (non_terminal, length),
            };

            expansions += 1;
            if expansions > budget {
                return None;
            }

            let suffixes = &self.suffixes[nt];
            let feasible: Vec<usize> = (0..suffixes.len())
                .filter(|&a| suffixes[a][0].contains(length))
                .collect();
            if feasible.is_empty() {
                return None;
            }
            let a = feasible[rng.gen_range(0..feasible.len())];
            let alt = &self.grammar.alternatives(nt)[a];

            let mut remaining = length;
            let mut parts = Vec::with_capacity(alt.len());
            for (k, symbol) in alt.iter().enumerate() {
                let rest = suffixes[a][k + 1];
                let options = self.split_options(symbol, remaining, rest);
                let pick = options.nth(rng.gen_range(0..options.len().max(1)))?;
                parts.push((symbol, pick));
                remaining -= pick;
            }

            for (symbol, part) in parts.into_iter().rev() {
                match symbol {
                    Symbol::Terminal(chars) => stack.push(Pending::Emit(chars)),
                    Symbol::NonTerminal(child) => stack.push(Pending::Expand {
                        non_terminal: *child,
                        length: part,
                    }),
                }
            }
        }

        Some(out)
    }

    /// Lengths `m` that `symbol` can take so that `rest` still covers
    /// `remaining - m`.
    fn split_options(&self, symbol: &Symbol, remaining: usize, rest: Bits) -> Bits {
        let mut options = Bits::EMPTY;
        for m in self.symbol_lengths(symbol).iter() {
            if m <= remaining && rest.contains(remaining - m) {
                options.insert(m);
            }
        }
        options
    }

    fn symbol_lengths(&self, symbol: &Symbol) -> Bits {
        symbol_lengths(symbol, &self.lengths, self.length)
    }

    /// Per-position terminal sets for strings of the full length.
    fn compute_position_alphabet(&self) -> Vec<Vec<char>> {
        let nts = self.grammar.non_terminal_count();
        let limit = self.length;
        // chars[nt][len][offset]: alphabet indices at offset in nt-strings of len
        let mut chars: Vec<Vec<Vec<Bits>>> = (0..nts)
            .map(|_| (0..=limit).map(|len| vec![Bits::EMPTY; len]).collect())
            .collect();

        loop {
            let mut changed = false;
            for nt in 0..nts {
                for (a, alt) in self.grammar.alternatives(nt).iter().enumerate() {
                    let suffix = &self.suffixes[nt][a];
                    for len in suffix[0].iter() {
                        let mut acc = vec![Bits::EMPTY; len];
                        let mut visited = vec![Bits::EMPTY; alt.len() + 1];
                        self.collect_chars(alt, suffix, 0, 0, len, &chars, &mut acc, &mut visited);
                        for (slot, found) in chars[nt][len].iter_mut().zip(acc) {
                            let merged = slot.union(found);
                            if merged != *slot {
                                *slot = merged;
                                changed = true;
                            }
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }

        let alphabet = self.grammar.alphabet();
        chars[self.grammar.start()][limit]
            .iter()
            .map(|set| set.iter().filter_map(|i| alphabet.get(i).copied()).collect())
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_chars(
        &self,
        alt: &[Symbol],
        suffix: &[Bits],
        k: usize,
        offset: usize,
        total: usize,
        chars: &[Vec<Vec<Bits>>],
        acc: &mut [Bits],
        visited: &mut [Bits],
    ) {
        if k == alt.len() || visited[k].contains(offset) {
            return;
        }
        visited[k].insert(offset);

        let remaining = total - offset;
        let symbol = &alt[k];
        for m in self.split_options(symbol, remaining, suffix[k + 1]).iter() {
            match symbol {
                Symbol::Terminal(literal) => {
                    for (q, &c) in literal.iter().enumerate() {
                        if let Some(idx) = self.grammar.alphabet_index(c) {
                            acc[offset + q].insert(idx);
                        }
                    }
                }
                Symbol::NonTerminal(child) => {
                    for (q, &set) in chars[*child][m].iter().enumerate() {
                        acc[offset + q] = acc[offset + q].union(set);
                    }
                }
            }
            self.collect_chars(alt, suffix, k + 1, offset + m, total, chars, acc, visited);
        }
    }
}

/// Lazy, restartable stream of random strings of a [`Language`].
///
/// Ends when [`DEFAULT_MAX_RETRIES`] consecutive draws exhaust their
/// expansion budget.
#[derive(Debug)]
pub struct Derivations<'l, R> {
    language: &'l Language,
    rng: R,
    max_retries: usize,
}

impl<R> Derivations<'_, R> {
    /// Override how many failed draws are tolerated per item.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }
}

impl<R: Rng> Iterator for Derivations<'_, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        (0..self.max_retries).find_map(|_| self.language.derive_once(&mut self.rng))
    }
}

/// Fixpoint over derivable lengths, capped at `limit`.
fn derivable_lengths(grammar: &Grammar, limit: usize) -> Vec<Bits> {
    let mut lengths = vec![Bits::EMPTY; grammar.non_terminal_count()];
    loop {
        let mut changed = false;
        for nt in 0..grammar.non_terminal_count() {
            for alt in grammar.alternatives(nt) {
                let derived = suffix_lengths(alt, &lengths, limit)[0];
                let merged = lengths[nt].union(derived);
                if merged != lengths[nt] {
                    lengths[nt] = merged;
                    changed = true;
                }
            }
        }
        if !changed {
            return lengths;
        }
    }
}

/// `out[k]` is the set of lengths derivable from `alt[k..]`.
fn suffix_lengths(alt: &[Symbol], lengths: &[Bits], limit: usize) -> Vec<Bits> {
    let mut out = vec![Bits::EMPTY; alt.len() + 1];
    out[alt.len()] = Bits::single(0);
    for k in (0..alt.len()).rev() {
        out[k] = symbol_lengths(&alt[k], lengths, limit).sum(out[k + 1], limit);
    }
    out
}

fn symbol_lengths(symbol: &Symbol, lengths: &[Bits], limit: usize) -> Bits {
    match symbol {
        Symbol::Terminal(chars) if chars.len() <= limit => Bits::single(chars.len()),
        Symbol::Terminal(_) => Bits::EMPTY,
        Symbol::NonTerminal(nt) => lengths[*nt],
    }
}

/// Whether `alt` derives exactly `s[i..j]` given the current span table.
fn matches_sequence(
    alt: &[Symbol],
    s: &[char],
    i: usize,
    j: usize,
    spans: &[Bits],
    width: usize,
) -> bool {
    let within = Bits::up_to(j);
    let mut reach = Bits::single(i);
    for symbol in alt {
        let mut next = Bits::EMPTY;
        for p in reach.iter() {
            match symbol {
                Symbol::Terminal(literal) => {
                    let q = p + literal.len();
                    if q <= j && s[p..q] == literal[..] {
                        next.insert(q);
                    }
                }
                Symbol::NonTerminal(nt) => {
                    next = next.union(spans[nt * width + p].intersect(within));
                }
            }
        }
        if next.is_empty() {
            return false;
        }
        reach = next;
    }
    reach.contains(j)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn mathler() -> Language {
        Grammar::mathler().unwrap().language(6).unwrap()
    }

    #[test]
    fn test_validate_known_expressions() {
        let language = mathler();
        for text in ["1+2345", "12+3*4", "1+2*34", "1*23+4", "111+11", "-12345", "1+-234"] {
            assert!(language.validate(text), "{text} should be derivable");
        }
    }

    #[test]
    fn test_validate_rejects_non_members() {
        let language = mathler();
        for text in ["2+3*4", "1234/0", "01+234", "12++34", "1+2345+", "abcdef", "12*/34"] {
            assert!(!language.validate(text), "{text} should not be derivable");
        }
    }

    #[test]
    fn test_derivations_are_exact_length_and_valid() {
        let language = mathler();
        let rng = ChaCha8Rng::seed_from_u64(3);
        for text in language.derivations(rng).take(200) {
            assert_eq!(text.chars().count(), 6);
            assert!(language.validate(&text), "{text} generated but not derivable");
        }
    }

    #[test]
    fn test_derivations_restart_identically() {
        let language = mathler();
        let a: Vec<String> = language.derivations(ChaCha8Rng::seed_from_u64(9)).take(20).collect();
        let b: Vec<String> = language.derivations(ChaCha8Rng::seed_from_u64(9)).take(20).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_strings_of_length() {
        let err = Grammar::mathler().unwrap().language(5).unwrap_err();
        assert!(matches!(err, GrammarError::NoStringsOfLength { length: 5, .. }));
    }

    #[test]
    fn test_position_alphabet() {
        let language = mathler();
        // First character is a digit or a leading minus, never * or /
        let first = language.alphabet_at(0);
        assert!(first.contains(&'-'));
        assert!(first.contains(&'9'));
        assert!(!first.contains(&'*'));
        // Last character is always a digit
        assert!(language.alphabet_at(5).iter().all(char::is_ascii_digit));
        assert!(language.alphabet_at(6).is_empty());
    }

    #[test]
    fn test_recursive_and_epsilon_rules() {
        let source = "%start <s>\n<s> ::= <s> \"a\" | <t>\n<t> ::= epsilon | <s>\n";
        let language = Grammar::parse(source).unwrap().language(4).unwrap();
        assert!(language.validate("aaaa"));
        assert!(!language.validate("aaab"));
        let rng = ChaCha8Rng::seed_from_u64(1);
        let drawn: Vec<String> = language.derivations(rng).take(5).collect();
        assert_eq!(drawn.len(), 5);
        assert!(drawn.iter().all(|text| text == "aaaa"));
    }

    #[test]
    fn test_length_out_of_range() {
        let err = Grammar::mathler().unwrap().language(0).unwrap_err();
        assert_eq!(err, GrammarError::LengthOutOfRange(0));
    }
}
