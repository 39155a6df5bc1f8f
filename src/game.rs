//! One game: secret, guesses, feedback, and termination.
//!
//! ```text
//!              submit
//! AwaitingGuess ──────► Evaluating ──┬─► Won   (all Exact)
//!       ▲                            ├─► Lost  (max_guesses reached)
//!       └────────────────────────────┘
//! ```

// Elapsed-time reporting
#![allow(clippy::cast_precision_loss)]

use crate::config::Configuration;
use crate::constraints::{ConstraintSet, Guess};
use crate::error::{GameError, SearchError};
use crate::expression::Expression;
use crate::feedback::{compare, Feedback};
use crate::grammar::Language;
use crate::metrics::{GameReport, GuessRecord, Outcome, Recorder, SearchObserver};
use crate::rng::{stream_rng, SEARCH_STREAM, SECRET_STREAM};
use crate::search::Searcher;
use std::time::Instant;
use tracing::{info, warn};

/// Derivations tried when drawing a random secret.
const SECRET_DRAWS: usize = 4096;

/// Where a game is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Waiting for the next guess.
    AwaitingGuess,
    /// A guess is being compared with the secret.
    Evaluating,
    /// The secret was guessed.
    Won,
    /// The guess limit was reached.
    Lost,
}

impl GameState {
    /// Whether no further guesses are accepted.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A single game against a fixed secret.
#[derive(Debug)]
pub struct Game {
    secret: Expression,
    max_guesses: usize,
    constraints: ConstraintSet,
    state: GameState,
}

impl Game {
    /// Start a game. The secret's value is revealed to the solver when the
    /// configuration asks for it.
    #[must_use]
    pub fn new(config: &Configuration, secret: Expression) -> Self {
        let target = config.game().reveal_target.then(|| secret.value());
        Self {
            constraints: ConstraintSet::new(secret.len(), target),
            max_guesses: config.game().max_guesses,
            secret,
            state: GameState::AwaitingGuess,
        }
    }

    /// The hidden expression.
    #[must_use]
    pub fn secret(&self) -> &Expression {
        &self.secret
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Facts known to the solver.
    #[must_use]
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Guesses so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Guess] {
        self.constraints.history()
    }

    /// Compare `guess` with the secret, record it, and advance the state.
    ///
    /// # Errors
    ///
    /// [`GameError::Finished`] once the game is won or lost.
    pub fn submit(&mut self, guess: &Expression) -> Result<Feedback, GameError> {
        if self.state.is_terminal() {
            return Err(GameError::Finished);
        }
        self.state = GameState::Evaluating;

        let feedback = compare(&self.secret, guess);
        self.constraints.observe(guess, &feedback);

        self.state = if feedback.is_solved() {
            GameState::Won
        } else if self.history().len() >= self.max_guesses {
            GameState::Lost
        } else {
            GameState::AwaitingGuess
        };
        Ok(feedback)
    }

    /// Let `searcher` guess until the game ends.
    ///
    /// # Errors
    ///
    /// Propagates [`SearchError`] if a guess cycle cannot produce a guess.
    pub fn play<O: SearchObserver + ?Sized>(
        &mut self,
        searcher: &mut Searcher<'_>,
        observer: &mut O,
    ) -> Result<GameState, SearchError> {
        while self.state == GameState::AwaitingGuess {
            let guess_index = self.history().len() + 1;
            let outcome = searcher.next_guess(&self.constraints, guess_index, observer)?;
            let Ok(feedback) = self.submit(&outcome.expression) else {
                break;
            };

            info!(
                guess = guess_index,
                expression = %outcome.expression,
                feedback = %feedback,
                fitness = outcome.fitness,
                generations = outcome.generations,
                "guess submitted"
            );
            observer.on_guess(&GuessRecord {
                guess_index,
                guess: outcome.expression.to_string(),
                feedback,
                fitness: outcome.fitness,
                generations: outcome.generations,
                eval_failures: outcome.eval_failures,
                elapsed_seconds: outcome.elapsed_seconds,
            });
        }
        Ok(self.state)
    }
}

/// Draw a secret from `language` using the secret stream of `seed`.
///
/// # Errors
///
/// [`SearchError::Exhausted`] if no evaluable expression is found.
pub fn draw_secret(language: &Language, seed: u64) -> Result<Expression, SearchError> {
    language
        .derivations(stream_rng(seed, SECRET_STREAM))
        .take(SECRET_DRAWS)
        .find_map(|text| Expression::new(language, &text).ok())
        .ok_or(SearchError::Exhausted {
            attempts: SECRET_DRAWS,
        })
}

/// Play one complete game and record it.
///
/// A search failure ends the game as [`Outcome::Aborted`] instead of
/// propagating, so batch runs continue past it.
///
/// # Errors
///
/// [`SearchError`] only if no secret could be drawn.
pub fn run_game(
    language: &Language,
    config: &Configuration,
    game_id: usize,
    seed: u64,
    secret: Option<Expression>,
) -> Result<GameReport, SearchError> {
    let started = Instant::now();
    let secret = match secret {
        Some(secret) => secret,
        None => draw_secret(language, seed)?,
    };

    let mut game = Game::new(config, secret);
    let mut searcher = Searcher::new(language, *config, stream_rng(seed, SEARCH_STREAM));
    let mut recorder = Recorder::default();

    let outcome = match game.play(&mut searcher, &mut recorder) {
        Ok(GameState::Won) => Outcome::Won,
        Ok(_) => Outcome::Lost,
        Err(e) => {
            warn!(game_id, seed, error = %e, "game aborted");
            Outcome::Aborted
        }
    };
    info!(
        game_id,
        seed,
        secret = %game.secret(),
        outcome = outcome.label(),
        guesses = game.history().len(),
        "game finished"
    );

    Ok(GameReport {
        game_id,
        seed,
        secret: game.secret().to_string(),
        target: game.secret().value().to_string(),
        outcome,
        guesses: recorder.guesses,
        generations: recorder.generations,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FitnessWeights, GameConfig, SearchConfig};
    use crate::grammar::Grammar;

    fn language() -> Language {
        Grammar::mathler().unwrap().language(6).unwrap()
    }

    fn config() -> Configuration {
        let search = SearchConfig {
            population_size: 80,
            generations_per_guess: 8,
            elitism_count: 4,
            ..SearchConfig::default()
        };
        let fitness = FitnessWeights {
            value_tolerance: None,
            ..FitnessWeights::default()
        };
        Configuration::new(search, fitness, GameConfig::default()).unwrap()
    }

    #[test]
    fn test_submit_transitions() {
        let language = language();
        let secret = Expression::new(&language, "12+3*4").unwrap();
        let wrong = Expression::new(&language, "99-8*7").unwrap();
        let mut game = Game::new(&config(), secret.clone());
        assert_eq!(game.state(), GameState::AwaitingGuess);

        game.submit(&wrong).unwrap();
        assert_eq!(game.state(), GameState::AwaitingGuess);
        let feedback = game.submit(&secret).unwrap();
        assert!(feedback.is_solved());
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.submit(&wrong), Err(GameError::Finished));
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn test_lost_after_max_guesses() {
        let language = language();
        let secret = Expression::new(&language, "12+3*4").unwrap();
        let wrong = Expression::new(&language, "99-8*7").unwrap();
        let mut game = Game::new(&config(), secret);
        for _ in 0..6 {
            game.submit(&wrong).unwrap();
        }
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.history().len(), 6);
    }

    #[test]
    fn test_draw_secret_is_deterministic() {
        let language = language();
        let a = draw_secret(&language, 11).unwrap();
        let b = draw_secret(&language, 11).unwrap();
        assert_eq!(a, b);
        assert!(language.validate(a.as_str()));
    }

    #[test]
    fn test_run_game_terminates() {
        let language = language();
        let report = run_game(&language, &config(), 0, 5, None).unwrap();
        assert!(report.guess_count() >= 1 && report.guess_count() <= 6);
        match report.outcome {
            Outcome::Won => assert!(report.guesses.last().unwrap().feedback.is_solved()),
            Outcome::Lost => assert_eq!(report.guess_count(), 6),
            Outcome::Aborted => panic!("search should not exhaust on the built-in grammar"),
        }
    }
}
