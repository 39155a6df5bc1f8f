//! Output formatting utilities for CLI.

use mathler::benchmark::BenchmarkSummary;
use mathler::tune::TrialRecord;
use mathler::GameReport;

/// Format one game, guess by guess.
pub(super) fn format_game_text(report: &GameReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game (seed: {})\n", report.seed));
    output.push_str(&format!("  Target: {}\n", report.target));
    for g in &report.guesses {
        output.push_str(&format!(
            "  {:>2}. {}  {}  (fitness {:.3}, {} generations, {:.2}s)\n",
            g.guess_index, g.guess, g.feedback, g.fitness, g.generations, g.elapsed_seconds
        ));
    }
    output.push_str(&format!("  Secret: {}\n", report.secret));
    output.push_str(&format!(
        "  Outcome: {} in {} guesses\n",
        report.outcome.label(),
        report.guess_count()
    ));

    output
}

/// Format aggregate benchmark results.
pub(super) fn format_summary_text(summary: &BenchmarkSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("Benchmark Results ({} games)\n", summary.games));
    output.push_str(&format!("  Won:     {}\n", summary.wins));
    output.push_str(&format!("  Lost:    {}\n", summary.losses));
    output.push_str(&format!("  Aborted: {}\n", summary.aborted));
    output.push_str(&format!("  Win rate:       {:.1}%\n", summary.win_rate * 100.0));
    output.push_str(&format!("  Mean guesses:   {:.2}\n", summary.mean_guesses));
    output.push_str(&format!("  Median guesses: {:.1}\n", summary.median_guesses));
    output.push_str(&format!("  Eval failures:  {}\n", summary.eval_failures));

    output
}

/// Format the selected trial.
pub(super) fn format_trial_text(trial: &TrialRecord, total: usize) -> String {
    let mut output = String::new();
    let s = trial.config.search();
    let f = trial.config.fitness();

    output.push_str(&format!("Best of {total} trials: #{} (seed {})\n", trial.trial_id, trial.seed));
    output.push_str(&format!("  Score:        {:.2}\n", trial.score));
    output.push_str(&format!("  Win rate:     {:.1}%\n", trial.win_rate * 100.0));
    output.push_str(&format!("  Mean guesses: {:.2}\n", trial.mean_guesses));
    output.push_str(&format!("  population_size:       {}\n", s.population_size));
    output.push_str(&format!("  generations_per_guess: {}\n", s.generations_per_guess));
    output.push_str(&format!("  mutation_rate:         {:.4}\n", s.mutation_rate));
    output.push_str(&format!("  crossover_rate:        {:.4}\n", s.crossover_rate));
    output.push_str(&format!("  elitism_count:         {}\n", s.elitism_count));
    output.push_str(&format!("  tournament_size:       {}\n", s.tournament_size));
    output.push_str(&format!("  fitness.value:         {:.4}\n", f.value));
    output.push_str(&format!("  fitness.exact:         {:.4}\n", f.exact));
    output.push_str(&format!("  fitness.counts:        {:.4}\n", f.counts));
    output.push_str(&format!("  fitness.exclusions:    {:.4}\n", f.exclusions));
    output.push_str(&format!("  fitness.history:       {:.4}\n", f.history));
    match f.value_tolerance {
        Some(t) => output.push_str(&format!("  value_tolerance:       {t:.4}\n")),
        None => output.push_str("  value_tolerance:       off\n"),
    }

    output
}
