//! Per-position point mutation.
//!
//! Each position independently changes with the mutation rate to another
//! character that the language allows at that position. The result may
//! still be globally invalid and is re-validated by the caller.

use crate::grammar::Language;
use rand::Rng;

/// Mutate a copy of `chars`; `None` if no position changed.
pub(super) fn mutate<R: Rng>(
    chars: &[char],
    language: &Language,
    rate: f64,
    rng: &mut R,
) -> Option<Vec<char>> {
    let mut out = chars.to_vec();
    let mut changed = false;

    for (i, slot) in out.iter_mut().enumerate() {
        if !rng.gen_bool(rate) {
            continue;
        }
        let choices: Vec<char> = language
            .alphabet_at(i)
            .iter()
            .copied()
            .filter(|&c| c != *slot)
            .collect();
        if choices.is_empty() {
            continue;
        }
        *slot = choices[rng.gen_range(0..choices.len())];
        changed = true;
    }

    changed.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn language() -> Language {
        Grammar::mathler().unwrap().language(6).unwrap()
    }

    #[test]
    fn test_zero_rate_never_mutates() {
        let language = language();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let chars: Vec<char> = "12+3*4".chars().collect();
        assert!(mutate(&chars, &language, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_full_rate_changes_every_position() {
        let language = language();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let chars: Vec<char> = "12+3*4".chars().collect();
        let mutated = mutate(&chars, &language, 1.0, &mut rng).unwrap();
        for (i, (before, after)) in chars.iter().zip(&mutated).enumerate() {
            assert_ne!(before, after);
            assert!(language.alphabet_at(i).contains(after));
        }
    }
}
