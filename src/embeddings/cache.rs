// Memoizing embedding cache.
//
// Every evaluation resolves text through one EmbeddingCache built at the
// start of a run. The first lookup for a string goes to the backend; every
// later lookup for the identical string is served from memory. Entries are
// never evicted: a run embeds each comment and topic name once.
//
// The map sits behind a std Mutex that is never held across an await. Two
// tasks missing on the same string may both call the backend; the first
// insert wins and the second result is dropped, which is harmless because
// embedders are deterministic.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use super::similarity::{cosine_distance, cosine_similarity};
use super::traits::Embedder;

/// A shared, immutable embedding vector.
pub type Embedding = Arc<Vec<f64>>;

pub struct EmbeddingCache {
    embedder: Box<dyn Embedder>,
    entries: Mutex<HashMap<String, Embedding>>,
}

impl EmbeddingCache {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Embedding>>> {
        self.entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Embedding cache lock poisoned: {}", e))
    }

    /// Return the cached embedding for `text`, if any.
    pub fn cached(&self, text: &str) -> Result<Option<Embedding>> {
        Ok(self.lock()?.get(text).cloned())
    }

    /// Get the embedding for `text`, asking the backend only on first use.
    pub async fn get(&self, text: &str) -> Result<Embedding> {
        if let Some(hit) = self.cached(text)? {
            return Ok(hit);
        }

        debug!(text_preview = preview(text), "Embedding cache miss");
        let vector = self
            .embedder
            .embed(text)
            .await
            .with_context(|| format!("Failed to embed {:?}", preview(text)))?;

        let mut entries = self.lock()?;
        let entry = entries
            .entry(text.to_string())
            .or_insert_with(|| Arc::new(vector));
        Ok(Arc::clone(entry))
    }

    /// Embed every not-yet-cached text up front. Texts go to the backend
    /// in `embed_batch` calls of its preferred batch size, with up to
    /// `concurrency` batches in flight. Returns how many new entries were
    /// fetched.
    pub async fn warm(&self, texts: &[String], concurrency: usize) -> Result<usize> {
        let missing: Vec<String> = {
            let entries = self.lock()?;
            let mut seen = HashSet::new();
            texts
                .iter()
                .filter(|t| !entries.contains_key(t.as_str()) && seen.insert(t.as_str()))
                .cloned()
                .collect()
        };

        if missing.is_empty() {
            return Ok(0);
        }

        let batch_size = self.embedder.batch_size().max(1);
        info!(
            count = missing.len(),
            batch_size = batch_size,
            concurrency = concurrency,
            "Embedding texts"
        );

        let pb = ProgressBar::new(missing.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  Embedding [{bar:30}] {pos}/{len} ({eta})")
                .expect("valid template"),
        );

        let mut batches = stream::iter(missing.chunks(batch_size).map(|chunk| self.fill(chunk)))
            .buffer_unordered(concurrency.max(1));

        while let Some(result) = batches.next().await {
            match result {
                Ok(filled) => pb.inc(filled as u64),
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            }
        }
        pb.finish_and_clear();

        Ok(missing.len())
    }

    /// Embed one batch and insert the results. An entry that appeared in the
    /// meantime is kept.
    async fn fill(&self, batch: &[String]) -> Result<usize> {
        let vectors = self.embedder.embed_batch(batch).await.with_context(|| {
            format!(
                "Failed to embed a batch of {} texts starting with {:?}",
                batch.len(),
                batch.first().map(|t| preview(t)).unwrap_or_default()
            )
        })?;

        if vectors.len() != batch.len() {
            anyhow::bail!(
                "Embedding backend returned {} vectors for {} texts",
                vectors.len(),
                batch.len()
            );
        }

        let mut entries = self.lock()?;
        for (text, vector) in batch.iter().zip(vectors) {
            entries
                .entry(text.clone())
                .or_insert_with(|| Arc::new(vector));
        }
        Ok(batch.len())
    }

    /// Cosine similarity between the embeddings of two texts.
    pub async fn text_similarity(&self, a: &str, b: &str) -> Result<f64> {
        let a = self.get(a).await?;
        let b = self.get(b).await?;
        Ok(cosine_similarity(&a, &b))
    }

    /// Cosine distance between the embeddings of two texts.
    pub async fn text_distance(&self, a: &str, b: &str) -> Result<f64> {
        Ok(1.0 - self.text_similarity(a, b).await?)
    }

    /// Cosine distance between a precomputed vector and a text's embedding.
    pub async fn vector_text_distance(&self, vector: &[f64], text: &str) -> Result<f64> {
        let embedding = self.get(text).await?;
        Ok(cosine_distance(vector, &embedding))
    }

    /// Number of cached texts.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every cached entry.
    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

fn preview(text: &str) -> String {
    crate::output::truncate_chars(text, 50)
}
