//! Embedding configuration.

use campus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Embedding configuration, persisted alongside every built index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram", "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Whether to normalize embeddings to unit length
    #[serde(default = "default_normalize")]
    pub normalize: bool,

    /// Maximum texts per embedding call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Provider-specific configuration (e.g., `{"endpoint": "http://localhost:11434"}`)
    #[serde(default)]
    pub provider_config: serde_json::Value,
}

fn default_normalize() -> bool {
    true
}

fn default_batch_size() -> usize {
    64
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            normalize: default_normalize(),
            batch_size: default_batch_size(),
            provider_config: serde_json::json!({}),
        }
    }
}

impl EmbeddingConfig {
    /// String setting from `provider_config`.
    pub fn provider_setting(&self, key: &str) -> Option<&str> {
        self.provider_config.get(key).and_then(|v| v.as_str())
    }

    /// Validate that another config is consistent with this one.
    ///
    /// Vectors from different providers, models or sizes are not comparable,
    /// so an index may only be queried with the embedder that built it.
    pub fn validate_consistency(&self, other: &Self) -> AppResult<()> {
        if self.provider != other.provider {
            return Err(AppError::Index(format!(
                "Provider mismatch: expected '{}', got '{}'",
                self.provider, other.provider
            )));
        }

        if self.model != other.model {
            return Err(AppError::Index(format!(
                "Model mismatch: expected '{}', got '{}'",
                self.model, other.model
            )));
        }

        if self.dimensions != other.dimensions {
            return Err(AppError::Index(format!(
                "Dimension mismatch: expected {}, got {}",
                self.dimensions, other.dimensions
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "trigram");
        assert_eq!(config.model, "trigram-v1");
        assert_eq!(config.dimensions, 384);
        assert!(config.normalize);
        assert_eq!(config.batch_size, 64);
    }

    #[test]
    fn test_provider_setting() {
        let config = EmbeddingConfig {
            provider_config: serde_json::json!({"endpoint": "http://gpu-box:11434"}),
            ..Default::default()
        };
        assert_eq!(config.provider_setting("endpoint"), Some("http://gpu-box:11434"));
        assert_eq!(config.provider_setting("missing"), None);
    }

    #[test]
    fn test_validate_consistency_success() {
        let config1 = EmbeddingConfig::default();
        let config2 = EmbeddingConfig {
            batch_size: 8,
            ..config1.clone()
        };
        assert!(config1.validate_consistency(&config2).is_ok());
    }

    #[test]
    fn test_validate_consistency_provider_mismatch() {
        let config1 = EmbeddingConfig::default();
        let config2 = EmbeddingConfig {
            provider: "ollama".to_string(),
            ..config1.clone()
        };

        let result = config1.validate_consistency(&config2);
        assert!(result.unwrap_err().to_string().contains("Provider mismatch"));
    }

    #[test]
    fn test_validate_consistency_dimension_mismatch() {
        let config1 = EmbeddingConfig::default();
        let config2 = EmbeddingConfig {
            dimensions: 768,
            ..config1.clone()
        };

        let result = config1.validate_consistency(&config2);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Dimension mismatch"));
    }
}
