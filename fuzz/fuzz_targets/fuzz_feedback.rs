#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mathler::feedback::compare_chars;
use mathler::Mark;

const ALPHABET: &[char] = &['0', '1', '2', '3', '+', '-', '*', '/'];

/// Secret and guess as indices into a small alphabet, so repeats are common.
#[derive(Arbitrary, Debug)]
struct FeedbackInput {
    secret: [u8; 6],
    guess: [u8; 6],
}

fuzz_target!(|input: FeedbackInput| {
    let pick = |i: &u8| ALPHABET[usize::from(*i) % ALPHABET.len()];
    let secret: Vec<char> = input.secret.iter().map(pick).collect();
    let guess: Vec<char> = input.guess.iter().map(pick).collect();

    let feedback = compare_chars(&secret, &guess);
    assert_eq!(feedback.len(), 6);

    for c in ALPHABET {
        let in_secret = secret.iter().filter(|s| *s == c).count();
        let marked = guess
            .iter()
            .zip(feedback.marks())
            .filter(|(g, m)| *g == c && **m != Mark::Absent)
            .count();
        assert!(marked <= in_secret);
    }
    assert_eq!(feedback.is_solved(), secret == guess);
});
