//! Fitness of candidates against the current constraint set.
//!
//! Fitness is a weighted sum of terms that each lie in `[0, 1]`, so the best
//! possible score is the sum of the active weights. A candidate reaching it
//! satisfies every known fact and could be the secret.

use super::Candidate;
use crate::config::FitnessWeights;
use crate::constraints::ConstraintSet;

/// Score given to candidates whose evaluation failed.
pub const MIN_FITNESS: f64 = 0.0;

/// Tolerance when comparing a score with the attainable maximum.
const PERFECT_EPSILON: f64 = 1e-9;

/// Scores candidates for one guess cycle.
#[derive(Debug)]
pub(super) struct FitnessModel<'c> {
    constraints: &'c ConstraintSet,
    weights: FitnessWeights,
}

impl<'c> FitnessModel<'c> {
    pub(super) fn new(constraints: &'c ConstraintSet, weights: FitnessWeights) -> Self {
        Self {
            constraints,
            weights,
        }
    }

    /// Fitness of one candidate.
    pub(super) fn score(&self, candidate: &Candidate) -> f64 {
        let Ok(value) = candidate.value else {
            return MIN_FITNESS;
        };
        let chars = &candidate.chars;
        let w = &self.weights;

        let mut score = w.exact * self.constraints.exact_score(chars)
            + w.counts * self.constraints.count_score(chars)
            + w.exclusions * self.constraints.exclusion_score(chars)
            + w.history * self.constraints.history_score(chars);
        if let Some(target) = self.constraints.target() {
            score += w.value / (1.0 + value.distance(target));
        }
        score
    }

    /// Score of a candidate satisfying every term.
    pub(super) fn max_attainable(&self) -> f64 {
        let w = &self.weights;
        let mut max = w.exact + w.counts + w.exclusions + w.history;
        if self.constraints.target().is_some() {
            max += w.value;
        }
        max
    }

    /// Whether `score` reaches [`FitnessModel::max_attainable`].
    pub(super) fn is_perfect(&self, score: f64) -> bool {
        score >= self.max_attainable() - PERFECT_EPSILON
    }

    /// Whether `candidate` may be emitted as a guess: it evaluates, and its
    /// value lies within the configured tolerance of the revealed target.
    ///
    /// Off-target candidates keep their soft score so the population can
    /// climb toward the target, but they are never emitted.
    pub(super) fn on_target(&self, candidate: &Candidate) -> bool {
        let Ok(value) = candidate.value else {
            return false;
        };
        match (self.constraints.target(), self.weights.value_tolerance) {
            (Some(target), Some(tolerance)) => {
                value.distance(target) <= tolerance + PERFECT_EPSILON
            }
            _ => true,
        }
    }

    /// Score every member of `population`.
    pub(super) fn score_all(&self, population: &[Candidate]) -> Vec<f64> {
        population.iter().map(|c| self.score(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Value;
    use crate::expression::Expression;
    use crate::feedback::compare;
    use crate::grammar::Grammar;

    #[test]
    fn test_unfit_scores_minimum() {
        let constraints = ConstraintSet::new(6, Some(Value::integer(24)));
        let model = FitnessModel::new(&constraints, FitnessWeights::default());
        let broken = Candidate::from_text("1234/0".to_string());
        assert!(!broken.is_fit());
        assert!((model.score(&broken) - MIN_FITNESS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_target_value_is_perfect_without_history() {
        let constraints = ConstraintSet::new(6, Some(Value::integer(24)));
        let model = FitnessModel::new(&constraints, FitnessWeights::default());
        let hit = Candidate::from_text("12+3*4".to_string());
        let miss = Candidate::from_text("12+3*5".to_string());
        assert!(model.is_perfect(model.score(&hit)));
        assert!(model.score(&miss) < model.score(&hit));
    }

    #[test]
    fn test_hidden_target_drops_value_term() {
        let constraints = ConstraintSet::new(6, None);
        let weights = FitnessWeights::default();
        let model = FitnessModel::new(&constraints, weights);
        let expected = weights.exact + weights.counts + weights.exclusions + weights.history;
        assert!((model.max_attainable() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_value_tolerance_gates_emission() {
        let constraints = ConstraintSet::new(6, Some(Value::integer(24)));
        let model = FitnessModel::new(&constraints, FitnessWeights::default());
        let hit = Candidate::from_text("12+3*4".to_string());
        let near = Candidate::from_text("12+3*5".to_string());
        let broken = Candidate::from_text("1234/0".to_string());
        assert!(model.on_target(&hit));
        assert!(!model.on_target(&near));
        assert!(!model.on_target(&broken));

        let loose = FitnessWeights {
            value_tolerance: Some(3.0),
            ..FitnessWeights::default()
        };
        assert!(FitnessModel::new(&constraints, loose).on_target(&near));

        let soft = FitnessWeights {
            value_tolerance: None,
            ..FitnessWeights::default()
        };
        assert!(FitnessModel::new(&constraints, soft).on_target(&near));

        // Without a revealed target the rule has nothing to compare against
        let hidden = ConstraintSet::new(6, None);
        assert!(FitnessModel::new(&hidden, FitnessWeights::default()).on_target(&near));
    }

    #[test]
    fn test_secret_is_perfect_after_feedback() {
        let language = Grammar::mathler().unwrap().language(6).unwrap();
        let secret = Expression::new(&language, "12+3*4").unwrap();
        let guess = Expression::new(&language, "13+2*5").unwrap();
        let mut constraints = ConstraintSet::new(6, Some(secret.value()));
        constraints.observe(&guess, &compare(&secret, &guess));

        let model = FitnessModel::new(&constraints, FitnessWeights::default());
        assert!(model.is_perfect(model.score(&Candidate::from_expression(&secret))));
        assert!(!model.is_perfect(model.score(&Candidate::from_expression(&guess))));
    }
}
