// Local sentence embedding backend (all-MiniLM-L6-v2 via ONNX Runtime).
//
// For runs without Vertex access. Quality is lower than the large remote
// model, but the numbers are reproducible offline and cost nothing. Token
// embeddings are mean-pooled over the attention mask, matching how the
// model was trained.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::download::{MODEL_FILE, TOKENIZER_FILE};
use super::traits::Embedder;

/// Texts per inference call when embedding a batch.
const MAX_BATCH: usize = 32;

/// ONNX sentence embedder. The session sits behind a Mutex because `run`
/// needs exclusive access; inference runs on the blocking pool.
pub struct SentenceEmbedder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl SentenceEmbedder {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                anyhow::bail!(
                    "Embedding model file not found: {}\nRun `topiceval download-model` to download it.",
                    path.display()
                );
            }
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!("Failed to load embedding model from {}", model_path.display())
            })?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load embedding tokenizer: {}", e))?;

        debug!(model_dir = %model_dir.display(), "Loaded sentence embedding model");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }

    async fn run_blocking(&self, texts: Vec<String>) -> Result<Vec<Vec<f64>>> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        tokio::task::spawn_blocking(move || infer(&session, &tokenizer, &texts))
            .await
            .context("spawn_blocking panicked")?
    }
}

#[async_trait]
impl Embedder for SentenceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let mut out = self.run_blocking(vec![text.to_string()]).await?;
        out.pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding model returned no output"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_BATCH) {
            out.extend(self.run_blocking(chunk.to_vec()).await?);
        }
        Ok(out)
    }

    fn batch_size(&self) -> usize {
        MAX_BATCH
    }
}

/// Tokenize, pad, run the model, and pool. Runs on the blocking pool.
fn infer(
    session: &Mutex<Session>,
    tokenizer: &Tokenizer,
    texts: &[String],
) -> Result<Vec<Vec<f64>>> {
    let encodings = texts
        .iter()
        .map(|t| {
            tokenizer
                .encode(t.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let batch = encodings.len();
    let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
    if batch == 0 {
        return Ok(Vec::new());
    }
    if seq_len == 0 {
        anyhow::bail!("Tokenizer produced no tokens");
    }

    // BERT inputs, right-padded with id 0 / mask 0.
    let cells = batch * seq_len;
    let mut input_ids = Vec::with_capacity(cells);
    let mut attention_mask = Vec::with_capacity(cells);
    for enc in &encodings {
        let pad = seq_len - enc.get_ids().len();
        input_ids.extend(enc.get_ids().iter().map(|&id| id as i64));
        input_ids.extend(std::iter::repeat_n(0i64, pad));
        attention_mask.extend(enc.get_attention_mask().iter().map(|&m| m as i64));
        attention_mask.extend(std::iter::repeat_n(0i64, pad));
    }
    let token_type_ids = vec![0i64; cells];

    let shape = [batch as i64, seq_len as i64];
    let ids_tensor =
        Tensor::from_array((shape, input_ids)).context("Failed to create input_ids tensor")?;
    let mask_tensor = Tensor::from_array((shape, attention_mask.clone()))
        .context("Failed to create attention_mask tensor")?;
    let types_tensor = Tensor::from_array((shape, token_type_ids))
        .context("Failed to create token_type_ids tensor")?;

    // last_hidden_state: [batch, seq_len, hidden size]
    let (dims, hidden) = {
        let mut session = session
            .lock()
            .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;
        let outputs = session
            .run(ort::inputs! {
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => types_tensor
            })
            .context("Embedding ONNX inference failed")?;
        let (out_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .context("Failed to extract embedding output tensor")?;
        (out_shape.iter().copied().collect::<Vec<i64>>(), data.to_vec())
    };

    let dim = hidden_dim(&dims, batch, seq_len, hidden.len())?;
    Ok(mean_pool(&hidden, &attention_mask, batch, seq_len, dim))
}

/// Hidden size from the model's output shape, which must be
/// `[batch, seq_len, dim]` and match the data length.
fn hidden_dim(dims: &[i64], batch: usize, seq_len: usize, len: usize) -> Result<usize> {
    let [b, s, d] = dims else {
        anyhow::bail!("Expected a [batch, seq_len, dim] model output, got shape {dims:?}");
    };
    if *b != batch as i64 || *s != seq_len as i64 || *d <= 0 {
        anyhow::bail!("Model output shape {dims:?} doesn't match input [{batch}, {seq_len}, _]");
    }
    let dim = *d as usize;
    if len != batch * seq_len * dim {
        anyhow::bail!(
            "Model output has {len} values, shape {dims:?} needs {}",
            batch * seq_len * dim
        );
    }
    Ok(dim)
}

/// Average token vectors per sequence, counting only unmasked tokens.
fn mean_pool(
    hidden: &[f32],
    mask: &[i64],
    batch: usize,
    seq_len: usize,
    dim: usize,
) -> Vec<Vec<f64>> {
    (0..batch)
        .map(|i| {
            let mut sum = vec![0.0_f64; dim];
            let mut count = 0.0_f64;
            for j in 0..seq_len {
                if mask[i * seq_len + j] == 0 {
                    continue;
                }
                count += 1.0;
                let offset = (i * seq_len + j) * dim;
                for (acc, &v) in sum.iter_mut().zip(&hidden[offset..offset + dim]) {
                    *acc += v as f64;
                }
            }
            if count > 0.0 {
                sum.iter_mut().for_each(|v| *v /= count);
            }
            sum
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_ignores_padding() {
        // batch=2, seq_len=2, dim=2; second sequence has one padded token.
        let hidden = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 100.0, 100.0];
        let mask = [1, 1, 1, 0];
        let pooled = mean_pool(&hidden, &mask, 2, 2, 2);
        assert_eq!(pooled[0], vec![2.0, 3.0]);
        assert_eq!(pooled[1], vec![5.0, 6.0]);
    }

    #[test]
    fn test_mean_pool_fully_masked_is_zero() {
        let pooled = mean_pool(&[7.0, 7.0], &[0], 1, 1, 2);
        assert_eq!(pooled[0], vec![0.0, 0.0]);
    }

    #[test]
    fn test_hidden_dim_from_output_shape() {
        assert_eq!(hidden_dim(&[2, 5, 384], 2, 5, 2 * 5 * 384).unwrap(), 384);
        assert_eq!(hidden_dim(&[1, 3, 768], 1, 3, 3 * 768).unwrap(), 768);
    }

    #[test]
    fn test_hidden_dim_rejects_mismatched_output() {
        // Pooled [batch, dim] output instead of token states.
        assert!(hidden_dim(&[2, 384], 2, 5, 768).is_err());
        // Sequence length differs from the padded input.
        assert!(hidden_dim(&[2, 4, 384], 2, 5, 2 * 4 * 384).is_err());
        // Data shorter than the shape claims.
        assert!(hidden_dim(&[2, 5, 384], 2, 5, 100).is_err());
    }

    #[test]
    fn test_load_missing_model_names_download_command() {
        let dir = std::env::temp_dir().join("topiceval-no-model");
        let err = SentenceEmbedder::load(&dir).err().unwrap();
        assert!(err.to_string().contains("download-model"));
    }
}
