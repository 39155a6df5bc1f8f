//! Per-character feedback for a guess against a secret.
//!
//! Marks are computed in two passes. Exact matches claim their secret
//! character first; only the characters left over can then be claimed as
//! Present, left to right. A guess repeating a character more often than the
//! secret holds it therefore gets Absent marks for the surplus.

use crate::expression::Expression;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Classification of one guess position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Right character, right position.
    Exact,
    /// Character occurs at another position not already claimed.
    Present,
    /// Character has no unclaimed occurrence in the secret.
    Absent,
}

impl Mark {
    /// Single-letter code used in tables: `G`, `Y` or `X`.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Exact => 'G',
            Self::Present => 'Y',
            Self::Absent => 'X',
        }
    }
}

/// Marks aligned with the guess.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feedback(Vec<Mark>);

impl Feedback {
    /// The marks in guess order.
    #[must_use]
    pub fn marks(&self) -> &[Mark] {
        &self.0
    }

    /// Number of marks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no marks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every position is [`Mark::Exact`].
    #[must_use]
    pub fn is_solved(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|&m| m == Mark::Exact)
    }

    /// Number of positions carrying `mark`.
    #[must_use]
    pub fn count(&self, mark: Mark) -> usize {
        self.0.iter().filter(|&&m| m == mark).count()
    }
}

impl From<Vec<Mark>> for Feedback {
    fn from(marks: Vec<Mark>) -> Self {
        Self(marks)
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mark in &self.0 {
            write!(f, "{}", mark.code())?;
        }
        Ok(())
    }
}

/// Compare `guess` against `secret`.
#[must_use]
pub fn compare(secret: &Expression, guess: &Expression) -> Feedback {
    compare_chars(secret.chars(), guess.chars())
}

/// Character-slice form of [`compare`].
///
/// Positions beyond the shorter slice are compared as absent from the
/// secret; callers in this crate always pass equal lengths.
#[must_use]
pub fn compare_chars(secret: &[char], guess: &[char]) -> Feedback {
    let mut marks = vec![Mark::Absent; guess.len()];
    let mut remaining: HashMap<char, usize> = HashMap::new();

    for (i, &g) in guess.iter().enumerate() {
        match secret.get(i) {
            Some(&s) if s == g => marks[i] = Mark::Exact,
            Some(&s) => *remaining.entry(s).or_insert(0) += 1,
            None => {}
        }
    }
    for &s in secret.iter().skip(guess.len()) {
        *remaining.entry(s).or_insert(0) += 1;
    }

    for (i, &g) in guess.iter().enumerate() {
        if marks[i] == Mark::Exact {
            continue;
        }
        if let Some(count) = remaining.get_mut(&g).filter(|c| **c > 0) {
            *count -= 1;
            marks[i] = Mark::Present;
        }
    }

    Feedback(marks)
}

/// Compare two strings; `None` if their character counts differ.
#[must_use]
pub fn compare_text(secret: &str, guess: &str) -> Option<Feedback> {
    let secret: Vec<char> = secret.chars().collect();
    let guess: Vec<char> = guess.chars().collect();
    (secret.len() == guess.len()).then(|| compare_chars(&secret, &guess))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::Mark::{Absent as X, Exact as G, Present as Y};

    fn marks(secret: &str, guess: &str) -> Vec<Mark> {
        compare_text(secret, guess).unwrap().marks().to_vec()
    }

    #[test]
    fn test_identical_is_solved() {
        let feedback = compare_text("111+11", "111+11").unwrap();
        assert!(feedback.is_solved());
        assert_eq!(feedback.to_string(), "GGGGGG");
    }

    #[test]
    fn test_exact_claims_before_present() {
        // Secret "2+2*2" holds three 2s. Exact matches at 2 and 4 claim two,
        // so of the unmatched 2s at 1 and 3 only the first is Present.
        assert_eq!(marks("2+2*2", "-2222"), vec![X, Y, G, X, G]);
    }

    #[test]
    fn test_surplus_duplicates_are_absent() {
        assert_eq!(marks("12+2*3", "222+11"), vec![Y, G, X, Y, Y, X]);
    }

    #[test]
    fn test_present_scans_left_to_right() {
        assert_eq!(marks("1+2345", "55-1+4"), vec![Y, X, X, Y, Y, Y]);
    }

    #[test]
    fn test_length_mismatch_is_none() {
        assert!(compare_text("12+34", "12+345").is_none());
    }

    #[test]
    fn test_mark_codes() {
        let feedback = Feedback(vec![G, Y, X]);
        assert_eq!(feedback.to_string(), "GYX");
        assert_eq!(feedback.count(Mark::Present), 1);
        assert!(!feedback.is_solved());
    }
}
