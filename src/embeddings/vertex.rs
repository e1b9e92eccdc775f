// Vertex AI text embedding backend.
//
// Calls the `predict` endpoint of a Google text embedding model, one text
// per request (the experimental large model rejects multi-instance batches).
// Auth is a bearer access token, typically from
// `gcloud auth print-access-token`.
//
// API docs: https://cloud.google.com/vertex-ai/generative-ai/docs/embeddings/get-text-embeddings

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rate_limiter::RateLimiter;
use super::traits::Embedder;

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-large-exp-03-07";

/// Default Vertex region.
pub const DEFAULT_LOCATION: &str = "us-central1";

/// Vertex AI embedding client.
pub struct VertexEmbedder {
    client: Client,
    endpoint: String,
    access_token: String,
    rate_limiter: RateLimiter,
}

impl VertexEmbedder {
    pub fn new(
        project: &str,
        location: &str,
        model: &str,
        access_token: String,
        requests_per_second: f64,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: predict_url(project, location, model),
            access_token,
            rate_limiter: RateLimiter::new(requests_per_second),
        }
    }
}

/// Build the regional `predict` URL for a publisher model.
pub fn predict_url(project: &str, location: &str, model: &str) -> String {
    format!(
        "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:predict"
    )
}

#[async_trait]
impl Embedder for VertexEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        self.rate_limiter.acquire().await;

        let request = PredictRequest {
            instances: vec![Instance {
                content: text.to_string(),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .context("Failed to call Vertex AI embeddings API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Vertex AI returned {}: {}", status, body);
        }

        let result: PredictResponse = response
            .json()
            .await
            .context("Failed to parse Vertex AI embeddings response")?;

        let values = first_embedding(result)?;

        debug!(
            dim = values.len(),
            text_preview = crate::output::truncate_chars(text, 50),
            "Embedded text"
        );

        Ok(values)
    }
}

fn first_embedding(response: PredictResponse) -> Result<Vec<f64>> {
    response
        .predictions
        .into_iter()
        .next()
        .map(|p| p.embeddings.values)
        .ok_or_else(|| anyhow::anyhow!("Vertex AI response contained no predictions"))
}

// --- Vertex AI request/response types ---

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
}

#[derive(Serialize)]
struct Instance {
    content: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    embeddings: PredictionEmbeddings,
}

#[derive(Deserialize)]
struct PredictionEmbeddings {
    values: Vec<f64>,
}
