//! Ranking and tournament selection.
//!
//! Individuals are ranked by fitness with ties broken by expression text, so
//! a fixed seed always yields the same parents. Unfit individuals rank last
//! and are excluded from tournaments and elitism.

use super::Candidate;
use rand::Rng;

/// Population order used by selection and emission.
#[derive(Debug)]
pub(super) struct Ranking {
    /// Indices best first; fit individuals precede unfit ones.
    order: Vec<usize>,
    /// `position[i]` is where individual `i` sits in `order`.
    position: Vec<usize>,
    /// Number of fit individuals at the front of `order`.
    fit: usize,
}

impl Ranking {
    /// Rank `population` by `fitness`.
    pub(super) fn new(population: &[Candidate], fitness: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| {
            population[b]
                .is_fit()
                .cmp(&population[a].is_fit())
                .then_with(|| fitness[b].total_cmp(&fitness[a]))
                .then_with(|| population[a].text.cmp(&population[b].text))
        });

        let mut position = vec![0; order.len()];
        for (rank, &idx) in order.iter().enumerate() {
            position[idx] = rank;
        }
        let fit = population.iter().filter(|c| c.is_fit()).count();

        Self {
            order,
            position,
            fit,
        }
    }

    /// Fit individuals, best first.
    pub(super) fn fit(&self) -> &[usize] {
        &self.order[..self.fit]
    }

    /// The best fit individual, if any.
    pub(super) fn best(&self) -> Option<usize> {
        self.fit().first().copied()
    }
}

/// Indices chosen to build the next generation.
#[derive(Debug)]
pub(super) struct SelectionResult {
    /// Individuals preserved unchanged.
    pub(super) elite_indices: Vec<usize>,
    /// Parent pairs for crossover.
    pub(super) parent_pairs: Vec<(usize, usize)>,
}

/// Choose elites and enough parent pairs to refill `target_size`.
pub(super) fn select_parents<R: Rng>(
    ranking: &Ranking,
    elitism_count: usize,
    tournament_size: usize,
    target_size: usize,
    rng: &mut R,
) -> SelectionResult {
    let elite_indices: Vec<usize> = ranking
        .fit()
        .iter()
        .copied()
        .take(elitism_count.min(target_size))
        .collect();

    let offspring_needed = target_size.saturating_sub(elite_indices.len());
    let pairs_needed = offspring_needed.div_ceil(2);

    let mut parent_pairs = Vec::with_capacity(pairs_needed);
    if !ranking.fit().is_empty() {
        for _ in 0..pairs_needed {
            let p1 = tournament_select(ranking, tournament_size, rng);
            let p2 = tournament_select(ranking, tournament_size, rng);
            parent_pairs.push((p1, p2));
        }
    }

    SelectionResult {
        elite_indices,
        parent_pairs,
    }
}

/// Draw `k` fit individuals uniformly and return the best ranked.
///
/// The ranking must contain at least one fit individual.
fn tournament_select<R: Rng>(ranking: &Ranking, k: usize, rng: &mut R) -> usize {
    let fit = ranking.fit();
    let k = k.max(1);
    let mut best = fit[rng.gen_range(0..fit.len())];
    for _ in 1..k {
        let idx = fit[rng.gen_range(0..fit.len())];
        if ranking.position[idx] < ranking.position[best] {
            best = idx;
        }
    }
    best
}
