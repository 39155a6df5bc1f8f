#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mathler::Grammar;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Grammar source plus the length to restrict it to.
#[derive(Arbitrary, Debug)]
struct BnfInput {
    source: String,
    length: u8,
    seed: u64,
}

fuzz_target!(|input: BnfInput| {
    let Ok(grammar) = Grammar::parse(&input.source) else {
        return;
    };
    // Keep table construction cheap
    let length = usize::from(input.length % 12) + 1;
    let Ok(language) = grammar.language(length) else {
        return;
    };

    // Every draw has the exact length and is recognised by the same language
    for text in language
        .derivations(ChaCha8Rng::seed_from_u64(input.seed))
        .with_max_retries(8)
        .take(16)
    {
        assert_eq!(text.chars().count(), length);
        assert!(language.validate(&text), "{text:?} drawn but not derivable");
    }
});
