//! Benchmarks for the guess cycle and full games.
//!
//! The guess cycle is the hot path: derivation, recognition, and fitness.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use mathler::config::{FitnessWeights, GameConfig, SearchConfig};
use mathler::feedback::compare_text;
use mathler::metrics::NoopObserver;
use mathler::rng::{SEARCH_STREAM, stream_rng};
use mathler::{Configuration, ConstraintSet, Grammar, Searcher, evaluate, run_game};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn bench_config() -> Configuration {
    let search = SearchConfig {
        population_size: 200,
        generations_per_guess: 10,
        elitism_count: 10,
        ..SearchConfig::default()
    };
    Configuration::new(search, FitnessWeights::default(), GameConfig::default()).unwrap()
}

fn bench_primitives(c: &mut Criterion) {
    let language = Grammar::mathler().unwrap().language(6).unwrap();

    c.bench_function("derive_100", |b| {
        b.iter(|| {
            let drawn: Vec<String> = language
                .derivations(ChaCha8Rng::seed_from_u64(black_box(7)))
                .take(100)
                .collect();
            black_box(drawn)
        });
    });

    c.bench_function("validate", |b| {
        b.iter(|| black_box(language.validate(black_box("12+3*4"))));
    });

    c.bench_function("evaluate", |b| {
        b.iter(|| black_box(evaluate(black_box("-9/3*7"))));
    });

    c.bench_function("compare", |b| {
        b.iter(|| black_box(compare_text(black_box("12+2*3"), black_box("222+11"))));
    });
}

fn bench_guess_cycle(c: &mut Criterion) {
    let language = Grammar::mathler().unwrap().language(6).unwrap();
    let config = bench_config();
    let constraints = ConstraintSet::new(6, None);

    c.bench_function("guess_cycle_200x10", |b| {
        b.iter(|| {
            let mut searcher = Searcher::new(&language, config, stream_rng(black_box(42), SEARCH_STREAM));
            black_box(searcher.next_guess(&constraints, 1, &mut NoopObserver))
        });
    });
}

fn bench_full_game(c: &mut Criterion) {
    let language = Grammar::mathler().unwrap().language(6).unwrap();
    let config = bench_config();

    let mut group = c.benchmark_group("game");
    group.sample_size(10);
    group.bench_function("full_game_200x10", |b| {
        b.iter(|| black_box(run_game(&language, &config, 0, black_box(42), None)));
    });
    group.finish();
}

criterion_group!(benches, bench_primitives, bench_guess_cycle, bench_full_game);
criterion_main!(benches);
