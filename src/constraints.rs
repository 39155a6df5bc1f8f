//! Facts accumulated from feedback during one game.

// Ratios of small counts
#![allow(clippy::cast_precision_loss)]

use crate::eval::Value;
use crate::expression::Expression;
use crate::feedback::{compare_chars, Feedback, Mark};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A submitted guess and the feedback it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guess {
    /// The guessed expression.
    pub expression: Expression,
    /// Marks returned for it.
    pub feedback: Feedback,
}

/// Cumulative knowledge about the secret.
///
/// Only grows: every fact added by [`ConstraintSet::observe`] stays true for
/// the rest of the game.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    exact: Vec<Option<char>>,
    excluded: Vec<BTreeSet<char>>,
    min_counts: BTreeMap<char, usize>,
    max_counts: BTreeMap<char, usize>,
    history: Vec<Guess>,
    target: Option<Value>,
}

impl ConstraintSet {
    /// No facts yet for expressions of `length`, optionally knowing the
    /// secret's value.
    #[must_use]
    pub fn new(length: usize, target: Option<Value>) -> Self {
        Self {
            exact: vec![None; length],
            excluded: vec![BTreeSet::new(); length],
            min_counts: BTreeMap::new(),
            max_counts: BTreeMap::new(),
            history: Vec::new(),
            target,
        }
    }

    /// Record a guess and derive the facts its feedback implies.
    pub fn observe(&mut self, guess: &Expression, feedback: &Feedback) {
        let mut hits: BTreeMap<char, usize> = BTreeMap::new();
        let mut capped: BTreeSet<char> = BTreeSet::new();

        for (i, (&c, &mark)) in guess.chars().iter().zip(feedback.marks()).enumerate() {
            match mark {
                Mark::Exact => {
                    if let Some(slot) = self.exact.get_mut(i) {
                        *slot = Some(c);
                    }
                    *hits.entry(c).or_insert(0) += 1;
                }
                Mark::Present => {
                    if let Some(set) = self.excluded.get_mut(i) {
                        set.insert(c);
                    }
                    *hits.entry(c).or_insert(0) += 1;
                }
                Mark::Absent => {
                    if let Some(set) = self.excluded.get_mut(i) {
                        set.insert(c);
                    }
                    capped.insert(c);
                }
            }
        }

        for (&c, &n) in &hits {
            let min = self.min_counts.entry(c).or_insert(0);
            *min = (*min).max(n);
        }
        for c in capped {
            let n = hits.get(&c).copied().unwrap_or(0);
            let max = self.max_counts.entry(c).or_insert(n);
            *max = (*max).min(n);
        }

        self.history.push(Guess {
            expression: guess.clone(),
            feedback: feedback.clone(),
        });
    }

    /// Guesses observed so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Guess] {
        &self.history
    }

    /// The secret's value, if revealed.
    #[must_use]
    pub fn target(&self) -> Option<Value> {
        self.target
    }

    /// Known character at `position`, if any.
    #[must_use]
    pub fn exact_at(&self, position: usize) -> Option<char> {
        self.exact.get(position).copied().flatten()
    }

    /// Known lower bound on occurrences of `c`.
    #[must_use]
    pub fn min_count(&self, c: char) -> usize {
        self.min_counts.get(&c).copied().unwrap_or(0)
    }

    /// Known upper bound on occurrences of `c`, if any.
    #[must_use]
    pub fn max_count(&self, c: char) -> Option<usize> {
        self.max_counts.get(&c).copied()
    }

    /// Whether `c` is known not to occur at `position`.
    #[must_use]
    pub fn is_excluded(&self, position: usize, c: char) -> bool {
        self.excluded.get(position).is_some_and(|set| set.contains(&c))
    }

    /// Cheap hard filter used when seeding: known exact positions hold,
    /// excluded positions are avoided, and absent characters do not appear.
    #[must_use]
    pub fn admits(&self, chars: &[char]) -> bool {
        chars.iter().enumerate().all(|(i, &c)| {
            self.exact_at(i).is_none_or(|known| known == c)
                && !self.is_excluded(i, c)
                && self.max_count(c) != Some(0)
        })
    }

    /// Fraction of known exact positions that `chars` matches.
    #[must_use]
    pub fn exact_score(&self, chars: &[char]) -> f64 {
        let known: Vec<(usize, char)> = self
            .exact
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|c| (i, c)))
            .collect();
        if known.is_empty() {
            return 1.0;
        }
        let matched = known.iter().filter(|&&(i, c)| chars.get(i) == Some(&c)).count();
        matched as f64 / known.len() as f64
    }

    /// Fraction of minimum and maximum count facts that `chars` satisfies.
    #[must_use]
    pub fn count_score(&self, chars: &[char]) -> f64 {
        let facts = self.min_counts.len() + self.max_counts.len();
        if facts == 0 {
            return 1.0;
        }
        let occurrences = |c: char| chars.iter().filter(|&&x| x == c).count();
        let satisfied = self
            .min_counts
            .iter()
            .filter(|&(&c, &n)| occurrences(c) >= n)
            .count()
            + self
                .max_counts
                .iter()
                .filter(|&(&c, &n)| occurrences(c) <= n)
                .count();
        satisfied as f64 / facts as f64
    }

    /// Fraction of constrained positions whose character is not excluded.
    #[must_use]
    pub fn exclusion_score(&self, chars: &[char]) -> f64 {
        let constrained: Vec<usize> = (0..self.excluded.len())
            .filter(|&i| !self.excluded[i].is_empty())
            .collect();
        if constrained.is_empty() {
            return 1.0;
        }
        let respected = constrained
            .iter()
            .filter(|&&i| chars.get(i).is_some_and(|c| !self.excluded[i].contains(c)))
            .count();
        respected as f64 / constrained.len() as f64
    }

    /// Fraction of past guesses whose feedback would be reproduced if
    /// `chars` were the secret.
    #[must_use]
    pub fn history_score(&self, chars: &[char]) -> f64 {
        if self.history.is_empty() {
            return 1.0;
        }
        let agreeing = self
            .history
            .iter()
            .filter(|g| compare_chars(chars, g.expression.chars()) == g.feedback)
            .count();
        agreeing as f64 / self.history.len() as f64
    }

    /// Whether `chars` could still be the secret.
    #[must_use]
    pub fn is_consistent(&self, chars: &[char]) -> bool {
        self.history
            .iter()
            .all(|g| compare_chars(chars, g.expression.chars()) == g.feedback)
    }
}
