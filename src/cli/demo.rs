//! Demo command implementation.

use super::output::format_game_text;
use super::{load_config, load_language, CliError};
use mathler::{run_game, Expression};
use std::path::Path;

/// Execute the demo command.
///
/// # Errors
///
/// Returns an error if the grammar, configuration, or secret is invalid.
pub(crate) fn execute(
    secret: Option<&str>,
    seed: Option<u64>,
    grammar: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let language = load_language(grammar, config.game().expression_length)?;
    let secret = secret
        .map(|text| Expression::new(&language, text))
        .transpose()?;
    let seed = seed.unwrap_or(config.search().seed);

    let report = run_game(&language, &config, 0, seed, secret)?;
    print!("{}", format_game_text(&report));
    Ok(())
}
