//! Ollama Embedding Provider
//!
//! Neural embeddings via a local Ollama server (`/api/embed`), e.g. with
//! `nomic-embed-text` or `all-minilm`.
//!
//! One HTTP call per batch and no retries: an embedding failure is an
//! infrastructure failure and is surfaced to the caller as-is.

use crate::embeddings::{normalize, EmbeddingConfig, EmbeddingProvider};
use campus_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embed";

/// Ollama embedding provider using the local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    normalize: bool,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider from configuration.
    ///
    /// The endpoint comes from `provider_config.endpoint`, then `OLLAMA_URL`,
    /// then the local default.
    pub fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let base_url = config
            .provider_setting("endpoint")
            .map(str::to_string)
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Index(format!("Failed to create HTTP client for Ollama: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            normalize: config.normalize,
        })
    }

    /// Check a response batch against the request and the configured size.
    fn finish_batch(&self, expected: usize, mut embeddings: Vec<Vec<f32>>) -> AppResult<Vec<Vec<f32>>> {
        if embeddings.len() != expected {
            return Err(AppError::Index(format!(
                "Ollama returned {} embeddings for {} texts",
                embeddings.len(),
                expected
            )));
        }

        for embedding in embeddings.iter_mut() {
            if embedding.len() != self.dimensions {
                return Err(AppError::Index(format!(
                    "Unexpected embedding dimensions: got {}, expected {}",
                    embedding.len(),
                    self.dimensions
                )));
            }
            if self.normalize {
                normalize(embedding);
            }
        }

        Ok(embeddings)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);
            return Err(AppError::Index(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse Ollama response: {}", e)))?;

        self.finish_batch(texts.len(), body.embeddings)
    }
}
