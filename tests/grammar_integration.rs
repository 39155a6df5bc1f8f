//! Integration tests for grammar files and custom languages.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::io::Write;

use mathler::config::{FitnessWeights, GameConfig, SearchConfig};
use mathler::{run_game, Configuration, Expression, ExpressionError, Grammar, GrammarError, Outcome};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TINY_BNF: &str = "\
# Single-digit binary expressions
%start <e>
<e> ::= <d> <op> <d>
<op> ::= \"+\" | \"-\"
    | \"*\"
<d> ::= \"1\" | \"2\" | \"3\" | \"4\"
";

fn write_grammar(source: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(source.as_bytes()).unwrap();
    file
}

#[test]
fn test_grammar_file_roundtrip() {
    let file = write_grammar(TINY_BNF);
    let language = Grammar::from_file(file.path()).unwrap().language(3).unwrap();

    assert!(language.validate("1+2"));
    assert!(language.validate("4*4"));
    assert!(!language.validate("1/2"));
    assert!(!language.validate("5+1"));
    assert_eq!(language.alphabet_at(1), &['*', '+', '-']);
}

#[test]
fn test_builtin_file_matches_embedded_grammar() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("grammars/mathler_expr6.bnf");
    let from_file = Grammar::from_file(&path).unwrap().language(6).unwrap();
    let embedded = Grammar::mathler().unwrap().language(6).unwrap();

    let draws: Vec<String> = embedded
        .derivations(ChaCha8Rng::seed_from_u64(17))
        .take(100)
        .collect();
    for text in &draws {
        assert!(from_file.validate(text), "{text} rejected by file grammar");
    }
}

#[test]
fn test_malformed_file_reports_line() {
    let file = write_grammar("%start <e>\n<e> ::= \"1\"\nthis is not bnf\n");
    let err = Grammar::from_file(file.path()).unwrap_err();
    assert!(matches!(err, GrammarError::Syntax { line: 3, .. }), "got {err:?}");
}

#[test]
fn test_undefined_non_terminal_in_file() {
    let file = write_grammar("%start <e>\n<e> ::= <d> \"+\" <missing>\n<d> ::= \"1\"\n");
    let err = Grammar::from_file(file.path()).unwrap_err();
    assert!(matches!(err, GrammarError::Undefined(ref name) if name == "<missing>"), "got {err:?}");
}

#[test]
fn test_every_builtin_draw_is_an_expression_or_an_eval_failure() {
    let language = Grammar::mathler().unwrap().language(6).unwrap();
    let mut evaluable = 0;
    for text in language.derivations(ChaCha8Rng::seed_from_u64(5)).take(500) {
        match Expression::new(&language, &text) {
            Ok(expression) => {
                assert_eq!(expression.as_str(), text);
                evaluable += 1;
            }
            Err(ExpressionError::Eval { .. }) => {}
            Err(e) => panic!("{text} drawn but rejected: {e}"),
        }
    }
    assert!(evaluable > 0);
}

#[test]
fn test_game_on_custom_grammar() {
    let file = write_grammar(TINY_BNF);
    let language = Grammar::from_file(file.path()).unwrap().language(3).unwrap();
    let search = SearchConfig {
        population_size: 40,
        generations_per_guess: 10,
        elitism_count: 4,
        ..SearchConfig::default()
    };
    let game = GameConfig {
        expression_length: 3,
        ..GameConfig::default()
    };
    let fitness = FitnessWeights {
        value_tolerance: None,
        ..FitnessWeights::default()
    };
    let config = Configuration::new(search, fitness, game).unwrap();

    let secret = Expression::new(&language, "3*4").unwrap();
    let report = run_game(&language, &config, 0, 8, Some(secret)).unwrap();
    assert_ne!(report.outcome, Outcome::Aborted);
    assert_eq!(report.target, "12");
    for guess in &report.guesses {
        assert!(language.validate(&guess.guess));
    }
}
