// Run every evaluation over a set of labeling runs.
//
// Embeds all comment texts and topic names up front (concurrently, with a
// progress bar), then computes the four metrics in a fixed order. The
// metrics themselves only hit the warm cache.

use anyhow::Result;
use tracing::{info, warn};

use super::analysis::NamedResult;
use super::categorization::analyze_categorization_diffs;
use super::centroid::analyze_centroid_silhouette_scores;
use super::topic_centered::analyze_topic_centered_silhouette_scores;
use super::topic_set::analyze_topic_set_similarity;
use crate::data::models::Dataset;
use crate::embeddings::EmbeddingCache;

pub const CATEGORIZATION_DIFF_RATE: &str = "Topic Categorization Diff Rate";
pub const TOPIC_SET_SIMILARITY: &str = "Topic Set Similarity";
pub const TOPIC_CENTERED_SILHOUETTE: &str = "Topic Centered Silhouette";
pub const CENTROID_SILHOUETTE: &str = "Centroid Silhouette";

/// Compute all evaluation rows.
///
/// Pairwise metrics need at least two datasets; with one they are skipped
/// and only the silhouette rows are returned.
pub async fn run_all(
    cache: &EmbeddingCache,
    datasets: &[Dataset],
    concurrency: usize,
) -> Result<Vec<NamedResult>> {
    if datasets.is_empty() {
        anyhow::bail!("Insufficient data: no datasets to evaluate");
    }

    let texts: Vec<String> = datasets.iter().flat_map(Dataset::embedding_texts).collect();
    let fetched = cache.warm(&texts, concurrency).await?;
    let cached = cache.len()?;
    info!(fetched, cached, "Embedding cache ready");

    let mut results = Vec::with_capacity(4);

    if datasets.len() >= 2 {
        info!("Computing categorization diff rate");
        results.push(NamedResult::new(
            CATEGORIZATION_DIFF_RATE,
            analyze_categorization_diffs(datasets)?,
        ));

        info!("Computing topic set similarity");
        results.push(NamedResult::new(
            TOPIC_SET_SIMILARITY,
            analyze_topic_set_similarity(cache, datasets).await?,
        ));
    } else {
        warn!("Only one dataset given, skipping pairwise evaluations");
    }

    info!("Computing topic-centered silhouette");
    results.push(NamedResult::new(
        TOPIC_CENTERED_SILHOUETTE,
        analyze_topic_centered_silhouette_scores(cache, datasets).await?,
    ));

    info!("Computing centroid silhouette");
    results.push(NamedResult::new(
        CENTROID_SILHOUETTE,
        analyze_centroid_silhouette_scores(cache, datasets).await?,
    ));

    Ok(results)
}
