// Embedder trait: the swap-ready abstraction over embedding backends.
//
// Evaluations never talk to a backend directly. They go through
// EmbeddingCache, which holds a boxed Embedder and memoizes its answers, so
// the remote Vertex model, the local ONNX model and a precomputed table are
// interchangeable.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Trait for turning text into a fixed-length embedding vector.
///
/// Implementations must be deterministic for identical input within a run;
/// the cache relies on that to treat duplicate requests as harmless.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;

    /// Embed multiple texts, returning vectors in the same order.
    /// Default implementation calls embed sequentially; backends that
    /// support batching override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// How many texts `EmbeddingCache::warm` hands to one `embed_batch`
    /// call. Backends that embed one text per request keep the default.
    fn batch_size(&self) -> usize {
        1
    }
}

/// Embedder backed by a fixed text -> vector table.
///
/// Used for offline runs against embeddings computed elsewhere, and in tests
/// where distances need to be exact. Unknown text is an error rather than a
/// zero vector, so a gap in the table can't masquerade as a real score.
#[derive(Debug, Clone, Default)]
pub struct StaticEmbedder {
    vectors: HashMap<String, Vec<f64>>,
}

impl StaticEmbedder {
    pub fn new(vectors: HashMap<String, Vec<f64>>) -> Self {
        Self { vectors }
    }

    /// Load a JSON object mapping text to vector, e.g.
    /// `{"Housing": [0.1, 0.2], "More bike lanes": [0.3, 0.1]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read embeddings file {}", path.display()))?;
        let vectors: HashMap<String, Vec<f64>> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse embeddings file {}", path.display()))?;
        Ok(Self::new(vectors))
    }

    /// Add or replace the vector for a text.
    pub fn insert(&mut self, text: impl Into<String>, vector: Vec<f64>) {
        self.vectors.insert(text.into(), vector);
    }

    /// Builder-style variant of `insert`.
    pub fn with(mut self, text: impl Into<String>, vector: Vec<f64>) -> Self {
        self.insert(text, vector);
        self
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        match self.vectors.get(text) {
            Some(v) => Ok(v.clone()),
            None => anyhow::bail!("No precomputed embedding for text {:?}", text),
        }
    }
}
