//! The guess-cycle loop: seed, score, select, recombine, mutate, emit.

// Elapsed-time reporting
#![allow(clippy::cast_precision_loss)]

use super::crossover::crossover;
use super::fitness::FitnessModel;
use super::mutation::mutate;
use super::selection::{select_parents, Ranking};
use super::Candidate;
use crate::config::Configuration;
use crate::constraints::ConstraintSet;
use crate::error::SearchError;
use crate::expression::Expression;
use crate::grammar::Language;
use crate::metrics::{FitnessStats, GenerationStats, SearchObserver};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::debug;

/// Filtered draws per population slot before seeding accepts anything.
const FILTERED_DRAWS_PER_SLOT: usize = 8;

/// Validity cache entries kept before the cache is reset.
const VALIDITY_CACHE_LIMIT: usize = 1 << 18;

/// The guess produced by one cycle.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The emitted guess.
    pub expression: Expression,
    /// Its fitness in the final generation.
    pub fitness: f64,
    /// Generations scored in this cycle.
    pub generations: usize,
    /// Evaluation failures summed over those generations.
    pub eval_failures: usize,
    /// Wall time of the cycle.
    pub elapsed_seconds: f64,
}

/// Proposes guesses for one game.
///
/// Owns the game's search RNG, a grammar-validity cache, and the
/// individuals carried between guess cycles.
#[derive(Debug)]
pub struct Searcher<'a> {
    language: &'a Language,
    config: Configuration,
    rng: ChaCha8Rng,
    validity: HashMap<String, bool>,
    carried: Vec<Candidate>,
}

impl<'a> Searcher<'a> {
    /// Create a searcher drawing randomness from `rng`.
    #[must_use]
    pub fn new(language: &'a Language, config: Configuration, rng: ChaCha8Rng) -> Self {
        Self {
            language,
            config,
            rng,
            validity: HashMap::new(),
            carried: Vec::new(),
        }
    }

    /// The language candidates are drawn from.
    #[must_use]
    pub fn language(&self) -> &'a Language {
        self.language
    }

    /// Run one guess cycle against `constraints`.
    ///
    /// # Errors
    ///
    /// [`SearchError::Exhausted`] if the grammar yields no evaluable
    /// candidate, [`SearchError::OffTarget`] if none of the final generation
    /// lies within the value tolerance of the revealed target.
    pub fn next_guess<O: SearchObserver + ?Sized>(
        &mut self,
        constraints: &ConstraintSet,
        guess_index: usize,
        observer: &mut O,
    ) -> Result<SearchOutcome, SearchError> {
        let started = Instant::now();
        let search = *self.config.search();
        let model = FitnessModel::new(constraints, *self.config.fitness());

        let mut timer = Instant::now();
        let (mut population, attempts) = self.seed(constraints)?;
        let mut rejections = 0;
        let mut eval_failures = 0;
        let mut generation = 0;

        let (ranking, fitness) = loop {
            let fitness = model.score_all(&population);
            let ranking = Ranking::new(&population, &fitness);
            let failures = population.len() - ranking.fit().len();
            eval_failures += failures;

            let stats = GenerationStats {
                guess_index,
                generation,
                fitness: FitnessStats::from_fitness(&fitness),
                eval_failures: failures,
                grammar_rejections: rejections,
                elapsed_seconds: timer.elapsed().as_secs_f64(),
            };
            debug!(
                guess = guess_index,
                generation,
                best = stats.fitness.best,
                mean = stats.fitness.mean,
                eval_failures = failures,
                grammar_rejections = rejections,
                "generation scored"
            );
            observer.on_generation(&stats);
            generation += 1;

            let Some(best) = ranking.best() else {
                return Err(SearchError::Exhausted { attempts });
            };
            let solved = model.is_perfect(fitness[best]) && model.on_target(&population[best]);
            if solved || generation >= search.generations_per_guess {
                break (ranking, fitness);
            }

            timer = Instant::now();
            let (next, rejected) = self.breed(&population, &ranking);
            population = next;
            rejections = rejected;
        };

        let guessed: HashSet<&str> = constraints
            .history()
            .iter()
            .map(|g| g.expression.as_str())
            .collect();
        let eligible: Vec<usize> = ranking
            .fit()
            .iter()
            .copied()
            .filter(|&i| model.on_target(&population[i]))
            .collect();
        // Prefer an unseen guess. If every eligible candidate was already
        // guessed, repeat the best eligible one.
        let pick = eligible
            .iter()
            .copied()
            .find(|&i| !guessed.contains(population[i].text.as_str()))
            .or_else(|| eligible.first().copied())
            .ok_or_else(|| SearchError::OffTarget {
                fit: ranking.fit().len(),
            })?;
        let score = fitness[pick];

        self.carried = ranking
            .fit()
            .iter()
            .take(search.carry_over)
            .map(|&i| population[i].clone())
            .collect();

        let expression = population
            .swap_remove(pick)
            .into_expression()
            .ok_or(SearchError::Exhausted { attempts })?;

        Ok(SearchOutcome {
            expression,
            fitness: score,
            generations: generation,
            eval_failures,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// Build the initial population: carried individuals, then draws that
    /// pass the cheap constraint filter, then unfiltered draws.
    fn seed(
        &mut self,
        constraints: &ConstraintSet,
    ) -> Result<(Vec<Candidate>, usize), SearchError> {
        let size = self.config.search().population_size;
        let mut population = std::mem::take(&mut self.carried);
        population.truncate(size);

        let budget = size * FILTERED_DRAWS_PER_SLOT;
        let mut attempts = 0;
        let mut rejected: Vec<Vec<char>> = Vec::new();
        let mut draws = self.language.derivations(&mut self.rng);

        while population.len() < size && attempts < budget {
            let Some(text) = draws.next() else {
                break;
            };
            attempts += 1;
            let chars: Vec<char> = text.chars().collect();
            if constraints.admits(&chars) {
                population.push(Candidate::from_chars(chars));
            } else if rejected.len() < size {
                rejected.push(chars);
            }
        }

        let mut rejected = rejected.into_iter();
        while population.len() < size {
            let chars = if let Some(chars) = rejected.next() {
                chars
            } else {
                let Some(text) = draws.next() else {
                    break;
                };
                attempts += 1;
                text.chars().collect()
            };
            population.push(Candidate::from_chars(chars));
        }

        if population.is_empty() {
            return Err(SearchError::Exhausted { attempts });
        }
        Ok((population, attempts))
    }

    /// Produce the next generation and the number of grammar rejections.
    fn breed(&mut self, population: &[Candidate], ranking: &Ranking) -> (Vec<Candidate>, usize) {
        let search = *self.config.search();
        let size = search.population_size;
        let selection = select_parents(
            ranking,
            search.elitism_count,
            search.tournament_size,
            size,
            &mut self.rng,
        );

        let mut next = Vec::with_capacity(size);
        let mut rejected = 0;

        for &idx in &selection.elite_indices {
            next.push(population[idx].clone());
        }

        for &(a, b) in &selection.parent_pairs {
            let (p1, p2) = (&population[a], &population[b]);
            let (c1, c2) = if self.rng.gen_bool(search.crossover_rate) {
                let (x, y) = crossover(&p1.chars, &p2.chars, search.crossover_points, &mut self.rng);
                (
                    self.accept_or_parent(x, p1, &mut rejected),
                    self.accept_or_parent(y, p2, &mut rejected),
                )
            } else {
                (p1.clone(), p2.clone())
            };

            for child in [c1, c2] {
                if next.len() >= size {
                    break;
                }
                let child = self.mutate_child(child, search.mutation_rate, &mut rejected);
                next.push(child);
            }
        }

        (next, rejected)
    }

    /// The child if the grammar accepts it, else a clone of `parent`.
    fn accept_or_parent(&mut self, chars: Vec<char>, parent: &Candidate, rejected: &mut usize) -> Candidate {
        if chars == parent.chars {
            return parent.clone();
        }
        if self.is_valid(&chars) {
            Candidate::from_chars(chars)
        } else {
            *rejected += 1;
            parent.clone()
        }
    }

    /// Mutate `child`, keeping it unchanged if the grammar rejects the result.
    fn mutate_child(&mut self, child: Candidate, rate: f64, rejected: &mut usize) -> Candidate {
        match mutate(&child.chars, self.language, rate, &mut self.rng) {
            Some(chars) if self.is_valid(&chars) => Candidate::from_chars(chars),
            Some(_) => {
                *rejected += 1;
                child
            }
            None => child,
        }
    }

    fn is_valid(&mut self, chars: &[char]) -> bool {
        let text: String = chars.iter().collect();
        if let Some(&valid) = self.validity.get(&text) {
            return valid;
        }
        if self.validity.len() >= VALIDITY_CACHE_LIMIT {
            self.validity.clear();
        }
        let valid = self.language.recognize(chars);
        self.validity.insert(text, valid);
        valid
    }
}
