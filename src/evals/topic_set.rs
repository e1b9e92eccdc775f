// Topic vocabulary similarity between labeling runs.
//
// Runs rarely reuse the exact same topic names ("Public transit" vs
// "Transit"), so vocabularies are compared semantically: each name is
// matched to its most similar name on the other side, and the best-match
// similarities are averaged in both directions.

use anyhow::Result;

use super::analysis::{mean, AnalysisResults};
use super::unordered_pairs;
use crate::data::models::Dataset;
use crate::embeddings::EmbeddingCache;

/// Symmetrized best-match similarity between two topic vocabularies.
///
/// 1.0 for identical vocabularies. An empty vocabulary on either side is an
/// insufficient-data error.
pub async fn topic_set_similarity(
    cache: &EmbeddingCache,
    topics_a: &[String],
    topics_b: &[String],
) -> Result<f64> {
    let mean_a = mean(&best_matches(cache, topics_a, topics_b).await?)?;
    let mean_b = mean(&best_matches(cache, topics_b, topics_a).await?)?;
    Ok((mean_a + mean_b) / 2.0)
}

/// For each topic in `from`, its highest similarity to any topic in `to`.
async fn best_matches(
    cache: &EmbeddingCache,
    from: &[String],
    to: &[String],
) -> Result<Vec<f64>> {
    if to.is_empty() {
        anyhow::bail!("Insufficient data: cannot match topics against an empty topic set");
    }

    let mut maxima = Vec::with_capacity(from.len());
    for topic in from {
        let mut best = f64::NEG_INFINITY;
        for other in to {
            let similarity = cache.text_similarity(topic, other).await?;
            if similarity.is_nan() {
                best = f64::NAN;
                break;
            }
            best = best.max(similarity);
        }
        maxima.push(best);
    }
    Ok(maxima)
}

/// Topic-set similarity over each pair of datasets' full vocabularies.
pub async fn analyze_topic_set_similarity(
    cache: &EmbeddingCache,
    datasets: &[Dataset],
) -> Result<AnalysisResults> {
    let vocabularies: Vec<Vec<String>> = datasets.iter().map(Dataset::topics).collect();

    let mut similarities = Vec::new();
    for (a, b) in unordered_pairs(&vocabularies) {
        similarities.push(topic_set_similarity(cache, a, b).await?);
    }
    AnalysisResults::new(&similarities)
}
