#![no_main]

use libfuzzer_sys::fuzz_target;
use mathler::evaluate;

fuzz_target!(|text: &str| {
    // Total and deterministic on any input
    let first = evaluate(text);
    assert_eq!(first, evaluate(text));

    if let Ok(value) = first {
        assert!(value.denom() > 0);
    }
});
