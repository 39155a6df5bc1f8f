//! Deterministic per-game random streams.
//!
//! A game seed yields independent `ChaCha8` streams for secret selection and
//! for the search, so supplying a secret never shifts the guess sequence.
//! Batch runs derive each game's seed from the run seed and the game index.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Stream used to draw the secret.
pub const SECRET_STREAM: u64 = 1;

/// Stream threaded through the search engine.
pub const SEARCH_STREAM: u64 = 2;

/// Stream used by the autotuner to sample trial configurations.
pub const TUNING_STREAM: u64 = 3;

/// Create the RNG for `stream` of `seed`.
#[must_use]
pub fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Seed for the `index`th game or trial of a run seeded with `base`.
///
/// Mixed with SplitMix64 so neighbouring runs do not share game seeds.
#[must_use]
pub fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base.wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
