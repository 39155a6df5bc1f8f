//! Property-based tests for feedback and evaluation.
//!
//! Run with: cargo test --release feedback_props

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use std::collections::HashMap;

use mathler::feedback::{compare_chars, compare_text};
use mathler::{evaluate, Mark};

const ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '+', '-', '*', '/',
];

fn word(len: usize) -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::sample::select(ALPHABET), len)
}

fn counts(chars: &[char]) -> HashMap<char, usize> {
    let mut map = HashMap::new();
    for &c in chars {
        *map.entry(c).or_insert(0) += 1;
    }
    map
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Exact marks sit exactly where the characters agree.
    #[test]
    fn prop_exact_iff_same_char(secret in word(6), guess in word(6)) {
        let feedback = compare_chars(&secret, &guess);
        prop_assert_eq!(feedback.len(), 6);
        for (i, mark) in feedback.marks().iter().enumerate() {
            prop_assert_eq!(*mark == Mark::Exact, secret[i] == guess[i]);
        }
        prop_assert!(feedback.count(Mark::Exact) <= 6);
    }

    /// Marks for a character never outnumber its occurrences in the secret.
    #[test]
    fn prop_matches_bounded_by_multiset(secret in word(6), guess in word(6)) {
        let feedback = compare_chars(&secret, &guess);
        let secret_counts = counts(&secret);
        let guess_counts = counts(&guess);

        let mut marked: HashMap<char, usize> = HashMap::new();
        for (c, mark) in guess.iter().zip(feedback.marks()) {
            if *mark != Mark::Absent {
                *marked.entry(*c).or_insert(0) += 1;
            }
        }
        for (c, n) in &guess_counts {
            let expected = (*n).min(secret_counts.get(c).copied().unwrap_or(0));
            prop_assert_eq!(marked.get(c).copied().unwrap_or(0), expected);
        }
    }

    /// A guess compared with itself is solved.
    #[test]
    fn prop_identical_is_solved(secret in word(6)) {
        let text: String = secret.iter().collect();
        prop_assert!(compare_text(&text, &text).unwrap().is_solved());
    }

    /// Swapping secret and guess preserves the number of Exact marks.
    #[test]
    fn prop_exact_count_symmetric(a in word(6), b in word(6)) {
        prop_assert_eq!(
            compare_chars(&a, &b).count(Mark::Exact),
            compare_chars(&b, &a).count(Mark::Exact)
        );
    }

    /// The evaluator returns a verdict for any string over the alphabet.
    #[test]
    fn prop_evaluate_total(text in word(6)) {
        let text: String = text.iter().collect();
        let first = evaluate(&text);
        prop_assert_eq!(first, evaluate(&text));
    }
}
