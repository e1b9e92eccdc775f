// Colored terminal output for evaluation results.

use colored::Colorize;

use super::format_score;
use crate::evals::silhouette::TopicScore;
use crate::evals::NamedResult;

/// Display the summary table of all evaluations.
pub fn display_results(results: &[NamedResult], dataset_count: usize) {
    println!(
        "\n{}",
        format!("=== Evaluation Results ({dataset_count} datasets) ===").bold()
    );
    println!();
    println!(
        "  {:<32} {:>8}  {:>8}  {:>8}  {:>8}",
        "Evaluation".dimmed(),
        "Mean".dimmed(),
        "Stdev".dimmed(),
        "Min".dimmed(),
        "Max".dimmed(),
    );
    println!("  {}", "-".repeat(72).dimmed());

    for row in results {
        let r = &row.results;
        println!(
            "  {:<32} {:>8}  {:>8}  {:>8}  {:>8}",
            row.name,
            colorize_score(r.mean),
            format_score(r.stdev),
            format_score(r.min),
            format_score(r.max),
        );
    }
    println!();

    if results.iter().any(|r| r.results.has_nan()) {
        println!(
            "  {} NaN means some comment carries every topic, so its separation is undefined.",
            "!".yellow()
        );
    }
}

/// Display a per-topic silhouette breakdown, worst topics first.
pub fn display_topic_scores(title: &str, scores: &[TopicScore]) {
    println!("\n{}", format!("=== {title} ({} topics) ===", scores.len()).bold());
    println!();
    println!(
        "  {:<40} {:>5}  {:>9}  {:>10}  {:>10}",
        "Topic".dimmed(),
        "Size".dimmed(),
        "Cohesion".dimmed(),
        "Separation".dimmed(),
        "Silhouette".dimmed(),
    );
    println!("  {}", "-".repeat(82).dimmed());

    let mut sorted: Vec<&TopicScore> = scores.iter().collect();
    sorted.sort_by(|a, b| a.silhouette.total_cmp(&b.silhouette));

    for score in sorted {
        println!(
            "  {:<40} {:>5}  {:>9}  {:>10}  {:>10}",
            super::truncate_chars(&score.topic, 37),
            score.size,
            format_score(score.cohesion),
            format_score(score.separation),
            colorize_score(score.silhouette),
        );
    }
    println!();
}

/// Color a silhouette-like score: green when well separated, red when
/// members sit closer to other topics than to their own.
fn colorize_score(value: f64) -> colored::ColoredString {
    let text = format_score(value);
    if value.is_nan() {
        text.yellow()
    } else if value >= 0.25 {
        text.green()
    } else if value >= 0.0 {
        text.normal()
    } else {
        text.red()
    }
}
