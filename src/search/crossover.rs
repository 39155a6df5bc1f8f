//! Point crossover on character sequences.
//!
//! Children are not checked here; the evolution loop validates them against
//! the grammar and falls back to the matching parent.

use rand::Rng;

/// Recombine two equal-length parents at one or two cut points.
///
/// With one point `a`, the children are `p1[..a] + p2[a..]` and
/// `p2[..a] + p1[a..]`. With two points the segment between them is swapped.
pub(super) fn crossover<R: Rng>(
    parent1: &[char],
    parent2: &[char],
    points: usize,
    rng: &mut R,
) -> (Vec<char>, Vec<char>) {
    let len = parent1.len().min(parent2.len());
    if len < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = if points >= 2 && len >= 3 {
        let a = rng.gen_range(1..len);
        let mut b = rng.gen_range(1..len - 1);
        if b >= a {
            b += 1;
        }
        (a.min(b), a.max(b))
    } else {
        (rng.gen_range(1..len), len)
    };

    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();
    child1[start..end].copy_from_slice(&parent2[start..end]);
    child2[start..end].copy_from_slice(&parent1[start..end]);
    (child1, child2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn test_one_point_swaps_suffix() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let p1 = chars("aaaaaa");
        let p2 = chars("bbbbbb");
        for _ in 0..50 {
            let (c1, c2) = crossover(&p1, &p2, 1, &mut rng);
            let cut = c1.iter().position(|&c| c == 'b').unwrap();
            assert!(cut >= 1);
            assert!(c1[cut..].iter().all(|&c| c == 'b'));
            assert!(c2[..cut].iter().all(|&c| c == 'b'));
            assert!(c2[cut..].iter().all(|&c| c == 'a'));
        }
    }

    #[test]
    fn test_two_point_swaps_middle() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let p1 = chars("aaaaaa");
        let p2 = chars("bbbbbb");
        for _ in 0..50 {
            let (c1, c2) = crossover(&p1, &p2, 2, &mut rng);
            assert_eq!(c1[0], 'a');
            assert_eq!(c2[0], 'b');
            let swapped = c1.iter().filter(|&&c| c == 'b').count();
            assert!((1..=4).contains(&swapped));
            for (x, y) in c1.iter().zip(&c2) {
                assert_ne!(x, y);
            }
        }
    }

    #[test]
    fn test_short_parents_are_cloned() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (c1, c2) = crossover(&['1'], &['2'], 1, &mut rng);
        assert_eq!((c1, c2), (vec!['1'], vec!['2']));
    }
}
