// Cosine similarity and centroid math over embedding vectors.
//
// Distance is 1 - cosine similarity. Unlike a clamped display score, these
// functions let degenerate input surface as NaN: a zero vector or a
// dimension mismatch means the embedding backend misbehaved, and that should
// show up in the final statistics.

use anyhow::Result;

/// Cosine similarity between two vectors: dot(a, b) / (|a| * |b|).
///
/// Ranges over [-1.0, 1.0]. Returns NaN for a zero-norm vector, for empty
/// input, or when the dimensions differ.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return f64::NAN;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    dot / (mag_a * mag_b)
}

/// Cosine distance: 1 - cosine similarity.
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

/// Element-wise mean of embedding vectors (a cluster centroid).
pub fn mean_embedding<V: AsRef<[f64]>>(embeddings: &[V]) -> Result<Vec<f64>> {
    let Some(first) = embeddings.first() else {
        anyhow::bail!("Cannot average an empty set of embeddings");
    };
    let dim = first.as_ref().len();
    let mut mean = vec![0.0_f64; dim];

    for emb in embeddings {
        let emb = emb.as_ref();
        if emb.len() != dim {
            anyhow::bail!(
                "Embedding dimension mismatch: expected {}, got {}",
                dim,
                emb.len()
            );
        }
        for (acc, &val) in mean.iter_mut().zip(emb) {
            *acc += val;
        }
    }

    let n = embeddings.len() as f64;
    for val in &mut mean {
        *val /= n;
    }

    Ok(mean)
}
