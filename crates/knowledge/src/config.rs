//! Assistant pipeline configuration.
//!
//! Stored at `.campus/assistant.yaml`; every field has a default so a
//! missing or partial file is fine.

use crate::embeddings::EmbeddingConfig;
use campus_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default DuckDuckGo HTML search endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// Pipeline settings: chunking, retrieval, embedding, web search, generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// Maximum chunk length in characters, provenance tag included
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks of one document
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub web_search: WebSearchConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    3
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedding: EmbeddingConfig::default(),
            web_search: WebSearchConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Web point extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebSearchConfig {
    /// Search endpoint (DuckDuckGo HTML interface)
    pub endpoint: String,

    /// How long a successful lookup is reused
    pub cache_ttl_secs: u64,

    /// Maximum points kept per query
    pub max_points: usize,

    /// Shortest acceptable point, in characters
    pub min_point_chars: usize,

    /// Longest acceptable point, in characters
    pub max_point_chars: usize,

    /// Case-insensitive boilerplate markers; a sentence containing one is dropped
    pub denylist: Vec<String>,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            cache_ttl_secs: 3600,
            max_points: 5,
            min_point_chars: 15,
            max_point_chars: 300,
            denylist: ["click here", "read more", "sponsored", "advertisement"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Generation request settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

impl AssistantConfig {
    /// Load from `.campus/assistant.yaml`, falling back to defaults.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        let config_path = get_config_path(workspace);

        if !config_path.exists() {
            tracing::debug!("No assistant config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        config.validate()?;
        tracing::debug!("Loaded assistant config from {:?}", config_path);
        Ok(config)
    }

    /// Save to `.campus/assistant.yaml`.
    pub fn save(&self, workspace: &Path) -> AppResult<()> {
        let config_path = get_config_path(workspace);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let yaml = serde_yaml::to_string(self)?;
        fs::write(&config_path, yaml).map_err(|e| {
            AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Saved assistant config to {:?}", config_path);
        Ok(())
    }

    /// Reject settings the pipeline cannot honor.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }
        if self.embedding.dimensions == 0 || self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "embedding dimensions and batch_size must be positive".to_string(),
            ));
        }
        let web = &self.web_search;
        if web.min_point_chars > web.max_point_chars {
            return Err(AppError::Config(format!(
                "min_point_chars ({}) exceeds max_point_chars ({})",
                web.min_point_chars, web.max_point_chars
            )));
        }
        Ok(())
    }
}

/// Path to the assistant config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".campus").join("assistant.yaml")
}

/// Path to the persisted index.
pub fn get_index_path(workspace: &Path) -> PathBuf {
    workspace.join(".campus").join("index.json")
}
