//! Search, fitness, and game parameters.
//!
//! A [`Configuration`] is validated when it is built or deserialised and is
//! never modified afterwards. The autotuner produces new values rather than
//! editing existing ones.

use crate::error::ConfigError;
use crate::grammar::MAX_LENGTH;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Evolutionary search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Upper bound on generations per guess.
    pub generations_per_guess: usize,
    /// Per-position mutation probability.
    pub mutation_rate: f64,
    /// Probability that a parent pair is recombined.
    pub crossover_rate: f64,
    /// Cut points per crossover (1 or 2).
    pub crossover_points: usize,
    /// Fit individuals copied unchanged into each new generation.
    pub elitism_count: usize,
    /// Individuals competing in each tournament.
    pub tournament_size: usize,
    /// Top individuals seeded into the next guess cycle.
    pub carry_over: usize,
    /// Run seed.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            generations_per_guess: 20,
            mutation_rate: 0.1,
            crossover_rate: 0.9,
            crossover_points: 1,
            elitism_count: 100,
            tournament_size: 4,
            carry_over: 0,
            seed: 42,
        }
    }
}

/// Weights of the fitness terms. Each term lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Closeness of the candidate's value to the revealed target.
    pub value: f64,
    /// Known exact positions matched.
    pub exact: f64,
    /// Minimum and maximum character counts satisfied.
    pub counts: f64,
    /// Per-position exclusions respected.
    pub exclusions: f64,
    /// Agreement of simulated feedback with every past guess.
    pub history: f64,
    /// Largest distance between a guess's value and the revealed target.
    /// Candidates further off are never emitted. `None` keeps the value as
    /// a soft term only.
    pub value_tolerance: Option<f64>,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            value: 2.0,
            exact: 1.0,
            counts: 1.0,
            exclusions: 1.0,
            history: 4.0,
            value_tolerance: Some(0.0),
        }
    }
}

/// Rules of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Guesses allowed before the game is lost.
    pub max_guesses: usize,
    /// Characters per expression.
    pub expression_length: usize,
    /// Whether the solver is told the secret's value.
    pub reveal_target: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_guesses: 6,
            expression_length: 6,
            reveal_target: true,
        }
    }
}

/// A validated, immutable parameter set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    search: SearchConfig,
    fitness: FitnessWeights,
    game: GameConfig,
}

/// Unvalidated form used for deserialisation.
#[derive(Deserialize)]
struct RawConfiguration {
    #[serde(default)]
    search: SearchConfig,
    #[serde(default)]
    fitness: FitnessWeights,
    #[serde(default)]
    game: GameConfig,
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = ConfigError;

    fn try_from(raw: RawConfiguration) -> Result<Self, Self::Error> {
        Self::new(raw.search, raw.fitness, raw.game)
    }
}

impl Configuration {
    /// Validate and assemble a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first parameter out of range.
    pub fn new(
        search: SearchConfig,
        fitness: FitnessWeights,
        game: GameConfig,
    ) -> Result<Self, ConfigError> {
        at_least("population_size", search.population_size, 2)?;
        at_least("generations_per_guess", search.generations_per_guess, 1)?;
        at_least("tournament_size", search.tournament_size, 1)?;
        at_least("elitism_count", search.elitism_count, 1)?;
        at_least("crossover_points", search.crossover_points, 1)?;
        probability("mutation_rate", search.mutation_rate)?;
        probability("crossover_rate", search.crossover_rate)?;

        if search.crossover_points > 2 {
            return Err(ConfigError::Inconsistent(format!(
                "crossover_points must be 1 or 2, got {}",
                search.crossover_points
            )));
        }
        if search.elitism_count >= search.population_size {
            return Err(ConfigError::Inconsistent(format!(
                "elitism_count ({}) must be below population_size ({})",
                search.elitism_count, search.population_size
            )));
        }
        if search.carry_over > search.population_size {
            return Err(ConfigError::Inconsistent(format!(
                "carry_over ({}) exceeds population_size ({})",
                search.carry_over, search.population_size
            )));
        }

        for (name, value) in [
            ("fitness.value", fitness.value),
            ("fitness.exact", fitness.exact),
            ("fitness.counts", fitness.counts),
            ("fitness.exclusions", fitness.exclusions),
            ("fitness.history", fitness.history),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::BadWeight { name, value });
            }
        }
        if let Some(value) = fitness
            .value_tolerance
            .filter(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(ConfigError::BadWeight {
                name: "fitness.value_tolerance",
                value,
            });
        }
        if fitness.exact + fitness.counts + fitness.exclusions + fitness.history <= 0.0 {
            return Err(ConfigError::Inconsistent(
                "at least one feedback fitness weight must be positive".to_string(),
            ));
        }

        at_least("max_guesses", game.max_guesses, 1)?;
        at_least("expression_length", game.expression_length, 1)?;
        if game.expression_length > MAX_LENGTH {
            return Err(ConfigError::Inconsistent(format!(
                "expression_length {} exceeds {MAX_LENGTH}",
                game.expression_length
            )));
        }

        Ok(Self {
            search,
            fitness,
            game,
        })
    }

    /// Search parameters.
    #[must_use]
    pub fn search(&self) -> &SearchConfig {
        &self.search
    }

    /// Fitness weights.
    #[must_use]
    pub fn fitness(&self) -> &FitnessWeights {
        &self.fitness
    }

    /// Game rules.
    #[must_use]
    pub fn game(&self) -> &GameConfig {
        &self.game
    }

    /// A copy with a different run seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.search.seed = seed;
        self
    }

    /// Load from a JSON file. Missing sections take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Load`] if the file cannot be read or parsed, or the
    /// validation error for out-of-range values.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Parse from JSON text.
    ///
    /// # Errors
    ///
    /// See [`Configuration::from_json_file`].
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfiguration =
            serde_json::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serialisation failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn at_least(name: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { name, min, value });
    }
    Ok(())
}

fn probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::NotProbability { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Configuration::default();
        let rebuilt = Configuration::new(*config.search(), *config.fitness(), *config.game());
        assert_eq!(rebuilt, Ok(config));
        assert_eq!(config.search().population_size, 1000);
        assert_eq!(config.search().elitism_count, 100);
        assert_eq!(config.game().max_guesses, 6);
    }

    #[test]
    fn test_rejects_tiny_population() {
        let search = SearchConfig {
            population_size: 1,
            ..SearchConfig::default()
        };
        let err = Configuration::new(search, FitnessWeights::default(), GameConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooSmall {
                name: "population_size",
                min: 2,
                value: 1
            }
        );
    }

    #[test]
    fn test_rejects_zero_elitism() {
        let search = SearchConfig {
            elitism_count: 0,
            ..SearchConfig::default()
        };
        let err = Configuration::new(search, FitnessWeights::default(), GameConfig::default());
        assert!(matches!(err, Err(ConfigError::TooSmall { name: "elitism_count", .. })));
    }

    #[test]
    fn test_rejects_bad_probability_and_weight() {
        let search = SearchConfig {
            mutation_rate: 1.5,
            ..SearchConfig::default()
        };
        let err = Configuration::new(search, FitnessWeights::default(), GameConfig::default());
        assert!(matches!(err, Err(ConfigError::NotProbability { name: "mutation_rate", .. })));

        let fitness = FitnessWeights {
            history: f64::NAN,
            ..FitnessWeights::default()
        };
        let err = Configuration::new(SearchConfig::default(), fitness, GameConfig::default());
        assert!(matches!(err, Err(ConfigError::BadWeight { name: "fitness.history", .. })));
    }

    #[test]
    fn test_value_tolerance_must_be_non_negative() {
        for bad in [-0.5, f64::INFINITY, f64::NAN] {
            let fitness = FitnessWeights {
                value_tolerance: Some(bad),
                ..FitnessWeights::default()
            };
            let err = Configuration::new(SearchConfig::default(), fitness, GameConfig::default());
            assert!(matches!(
                err,
                Err(ConfigError::BadWeight { name: "fitness.value_tolerance", .. })
            ));
        }

        let soft = FitnessWeights {
            value_tolerance: None,
            ..FitnessWeights::default()
        };
        assert!(Configuration::new(SearchConfig::default(), soft, GameConfig::default()).is_ok());
        assert_eq!(FitnessWeights::default().value_tolerance, Some(0.0));
    }

    #[test]
    fn test_json_null_tolerance_disables_rule() {
        let config = Configuration::from_json(r#"{"fitness": {"value_tolerance": null}}"#).unwrap();
        assert_eq!(config.fitness().value_tolerance, None);
        let config = Configuration::from_json(r#"{"fitness": {"value_tolerance": 2.5}}"#).unwrap();
        assert_eq!(config.fitness().value_tolerance, Some(2.5));
    }

    #[test]
    fn test_json_fills_defaults_and_validates() {
        let config = Configuration::from_json(r#"{"search": {"population_size": 50, "elitism_count": 5}}"#)
            .unwrap();
        assert_eq!(config.search().population_size, 50);
        assert_eq!(config.search().tournament_size, 4);
        assert_eq!(config.game().expression_length, 6);

        let err = Configuration::from_json(r#"{"search": {"population_size": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::TooSmall { .. }));
    }

    #[test]
    fn test_json_roundtrip_through_serde() {
        let config = Configuration::default().with_seed(7);
        let json = config.to_json().unwrap();
        let parsed: Configuration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
