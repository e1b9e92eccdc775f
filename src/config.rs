use std::env;
use std::path::PathBuf;

use anyhow::Result;

use crate::embeddings::{download, vertex};

/// Which embedding backend to use.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbedderBackend {
    /// Vertex AI text embeddings (default), needs project + access token
    Vertex,
    /// Local ONNX all-MiniLM-L6-v2, needs the model downloaded
    Onnx,
    /// JSON table of precomputed embeddings
    Precomputed,
}

impl EmbedderBackend {
    fn from_env_value(value: Option<&str>) -> Result<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("vertex") => Ok(Self::Vertex),
            Some("onnx") => Ok(Self::Onnx),
            Some("precomputed") => Ok(Self::Precomputed),
            Some(other) => anyhow::bail!(
                "Unknown TOPICEVAL_EMBEDDER {other:?}; expected vertex, onnx or precomputed"
            ),
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars only. A .env file is loaded at startup via
/// dotenvy.
pub struct Config {
    pub embedder: EmbedderBackend,
    pub gcp_project: String,
    pub gcp_location: String,
    /// OAuth access token for Vertex AI (`gcloud auth print-access-token`)
    pub gcp_access_token: String,
    pub embedding_model: String,
    /// Request rate cap for the remote embedding API
    pub embedding_qps: f64,
    /// Directory holding the ONNX sentence embedding model
    pub model_dir: PathBuf,
    /// JSON file of precomputed embeddings (precomputed backend)
    pub embeddings_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let embedder =
            EmbedderBackend::from_env_value(env::var("TOPICEVAL_EMBEDDER").ok().as_deref())?;

        let embedding_qps = match env::var("TOPICEVAL_EMBEDDING_QPS") {
            Ok(raw) => {
                let qps: f64 = raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("TOPICEVAL_EMBEDDING_QPS must be a number, got {raw:?}")
                })?;
                if qps.is_nan() || qps <= 0.0 {
                    anyhow::bail!("TOPICEVAL_EMBEDDING_QPS must be positive, got {qps}");
                }
                qps
            }
            Err(_) => 5.0,
        };

        Ok(Self {
            embedder,
            gcp_project: env::var("GOOGLE_CLOUD_PROJECT").unwrap_or_default(),
            gcp_location: env::var("GOOGLE_CLOUD_LOCATION")
                .unwrap_or_else(|_| vertex::DEFAULT_LOCATION.to_string()),
            gcp_access_token: env::var("GOOGLE_CLOUD_ACCESS_TOKEN").unwrap_or_default(),
            embedding_model: env::var("TOPICEVAL_EMBEDDING_MODEL")
                .unwrap_or_else(|_| vertex::DEFAULT_MODEL.to_string()),
            embedding_qps,
            model_dir: env::var("TOPICEVAL_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| download::default_model_dir()),
            embeddings_file: env::var("TOPICEVAL_EMBEDDINGS_FILE").ok().map(PathBuf::from),
        })
    }

    /// Check that Vertex AI credentials are configured.
    pub fn require_vertex(&self) -> Result<()> {
        if self.gcp_project.is_empty() {
            anyhow::bail!(
                "GOOGLE_CLOUD_PROJECT not set. Add it to your .env file,\n\
                 or set TOPICEVAL_EMBEDDER=onnx to embed locally."
            );
        }
        if self.gcp_access_token.is_empty() {
            anyhow::bail!(
                "GOOGLE_CLOUD_ACCESS_TOKEN not set.\n\
                 Run: export GOOGLE_CLOUD_ACCESS_TOKEN=$(gcloud auth print-access-token)"
            );
        }
        Ok(())
    }

    /// Validate that the chosen embedding backend has what it needs.
    pub fn require_embedder(&self) -> Result<()> {
        match self.embedder {
            EmbedderBackend::Vertex => self.require_vertex(),
            EmbedderBackend::Onnx => {
                if !download::model_files_present(&self.model_dir) {
                    anyhow::bail!(
                        "ONNX embedding model not found in {}\n\
                         Run `topiceval download-model` to download it.",
                        self.model_dir.display()
                    );
                }
                Ok(())
            }
            EmbedderBackend::Precomputed => match &self.embeddings_file {
                Some(path) if path.exists() => Ok(()),
                Some(path) => anyhow::bail!("Embeddings file not found: {}", path.display()),
                None => anyhow::bail!(
                    "TOPICEVAL_EMBEDDINGS_FILE not set (required for TOPICEVAL_EMBEDDER=precomputed)."
                ),
            },
        }
    }
}
