//! Error types for the campus assistant.
//!
//! One enum covers the whole pipeline. The first five variants are the
//! answering pipeline's own failure taxonomy; the rest are ambient
//! (configuration, I/O, transport, templating, serialization).

use thiserror::Error;

/// Unified error type for the campus assistant.
///
/// Messages are meant to be shown to an end user as-is.
#[derive(Error, Debug)]
pub enum AppError {
    /// A document could not be turned into text (bad file, no pages, no text)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// There was nothing to index after splitting
    #[error("Chunking error: {0}")]
    Chunking(String),

    /// Embedding or index infrastructure failure
    #[error("Index error: {0}")]
    Index(String),

    /// The generation model failed or returned nothing
    #[error("Generation error: {0}")]
    Generation(String),

    /// Web search failure. Never escapes the web point extractor.
    #[error("Web search error: {0}")]
    WebSearch(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider transport errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
