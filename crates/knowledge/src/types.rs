//! Campus knowledge type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded document: its name and raw bytes.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Document name, used as provenance in every chunk (e.g., "facilities.pdf")
    pub name: String,

    /// Raw uploaded bytes
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Text pulled out of a document. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub name: String,
    pub text: String,
}

/// A bounded, overlapping segment of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Deterministic identifier (hash of source, position and body)
    pub id: String,

    /// Source document name
    pub source: String,

    /// Position within the source document (0-based)
    pub position: u32,

    /// Full chunk content, provenance tag included
    pub content: String,
}

impl Chunk {
    /// Content without the provenance tag.
    pub fn body(&self) -> &str {
        let tag = provenance_tag(&self.source);
        self.content.strip_prefix(tag.as_str()).unwrap_or(&self.content)
    }
}

/// Provenance tag prefixed to every chunk's content.
pub fn provenance_tag(source: &str) -> String {
    format!("[Source: {}]\n\n", source)
}

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// A document dropped from a batch because extraction or chunking failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: String,
}

/// Result of the web point extractor. Never an error: failures are
/// reported in `error` with empty `points`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebPoints {
    /// Cleaned factual sentences, at most the configured maximum
    pub points: Vec<String>,

    /// Raw search text the points were taken from
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub raw: String,

    /// Search failure, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl WebPoints {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            points: Vec::new(),
            raw: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Answer to one question, with the evidence behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer text, verbatim
    pub answer: String,

    /// Chunks used as context, best match first
    pub sources: Vec<ScoredChunk>,

    /// Web points used as context (empty if none)
    pub web_points: Vec<String>,

    /// The web points as rendered into the prompt ("" if none)
    pub web_context: String,

    /// Absorbed web search failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_error: Option<String>,
}

/// Statistics for a built index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents that made it into the index
    pub documents: Vec<String>,

    /// Number of chunks
    pub chunks_count: usize,

    /// Embedding dimensions
    pub dimensions: usize,

    /// Embedding provider and model
    pub embedding: String,

    /// Build timestamp
    pub built_at: DateTime<Utc>,
}
