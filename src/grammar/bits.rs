//! Fixed-width set of small integers.
//!
//! Used for derivable lengths, reachable string positions, and alphabet
//! indices. Every member is below 128.

/// A set of integers in `0..128`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Bits(u128);

impl Bits {
    /// The empty set.
    pub(crate) const EMPTY: Self = Self(0);

    /// A set with one member.
    #[must_use]
    pub(crate) fn single(value: usize) -> Self {
        let mut bits = Self::EMPTY;
        bits.insert(value);
        bits
    }

    /// All integers in `0..=limit`.
    #[must_use]
    pub(crate) fn up_to(limit: usize) -> Self {
        if limit >= 127 {
            Self(u128::MAX)
        } else {
            Self((1u128 << (limit + 1)) - 1)
        }
    }

    #[must_use]
    pub(crate) fn contains(self, value: usize) -> bool {
        value < 128 && self.0 & (1u128 << value) != 0
    }

    pub(crate) fn insert(&mut self, value: usize) {
        if value < 128 {
            self.0 |= 1u128 << value;
        }
    }

    #[must_use]
    pub(crate) fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub(crate) fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub(crate) fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub(crate) fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Pairwise sums `a + b` that do not exceed `limit`.
    #[must_use]
    pub(crate) fn sum(self, other: Self, limit: usize) -> Self {
        let mut out = Self::EMPTY;
        for a in self.iter() {
            out.0 |= other.0 << a;
        }
        out.intersect(Self::up_to(limit))
    }

    /// Members in ascending order.
    pub(crate) fn iter(self) -> impl Iterator<Item = usize> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let next = rest.trailing_zeros() as usize;
            rest &= rest - 1;
            Some(next)
        })
    }

    /// The `n`th member in ascending order.
    #[must_use]
    pub(crate) fn nth(self, n: usize) -> Option<usize> {
        self.iter().nth(n)
    }
}
