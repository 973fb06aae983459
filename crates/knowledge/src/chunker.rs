//! Semantic text chunking with a hard size ceiling and overlap.
//!
//! Splitting is delegated to `text-splitter`, which cuts at the largest
//! semantic level that fits (paragraphs, lines, sentences, words, then
//! characters). The provenance tag counts against the ceiling, so the body
//! capacity is `chunk_size - tag_len` and the overlap shrinks by the same
//! amount to keep the stride at `chunk_size - overlap`.

use crate::types::{provenance_tag, Chunk, ExtractedDocument, SkippedDocument};
use campus_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use text_splitter::{ChunkConfig, TextSplitter};

/// Splits documents into provenance-tagged chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

/// Chunks for a batch, plus documents that could not be chunked.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedBatch {
    pub chunks: Vec<Chunk>,
    pub skipped: Vec<SkippedDocument>,
}

impl Chunker {
    /// `chunk_size` bounds the whole chunk, provenance tag included.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(AppError::Chunking(format!(
                "Invalid chunking parameters: size {}, overlap {}",
                chunk_size, overlap
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Chunk every document, preserving document order.
    ///
    /// A document that cannot be chunked is reported in `skipped`. Fails on
    /// an empty input set or when nothing survives splitting.
    pub fn chunk_documents(&self, documents: &[ExtractedDocument]) -> AppResult<ChunkedBatch> {
        if documents.is_empty() {
            return Err(AppError::Chunking("No documents to chunk".to_string()));
        }

        let mut chunks = Vec::new();
        let mut skipped = Vec::new();
        for document in documents {
            match self.chunk_document(&document.name, &document.text) {
                Ok(document_chunks) => chunks.extend(document_chunks),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", document.name, e);
                    skipped.push(SkippedDocument {
                        name: document.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if chunks.is_empty() {
            return Err(AppError::Chunking(
                "Text splitting produced no chunks".to_string(),
            ));
        }

        tracing::debug!(
            "Chunked {} documents into {} chunks (size: {}, overlap: {}, skipped: {})",
            documents.len(),
            chunks.len(),
            self.chunk_size,
            self.overlap,
            skipped.len()
        );

        Ok(ChunkedBatch { chunks, skipped })
    }

    /// Chunk one document. Whitespace-only text yields no chunks.
    ///
    /// Fails when the document name alone fills the chunk.
    pub fn chunk_document(&self, source: &str, text: &str) -> AppResult<Vec<Chunk>> {
        let tag = provenance_tag(source);
        let tag_len = tag.chars().count();
        if tag_len >= self.chunk_size {
            return Err(AppError::Chunking(format!(
                "Document name '{}' leaves no room for content in a {}-character chunk",
                source, self.chunk_size
            )));
        }

        let capacity = self.chunk_size - tag_len;
        let overlap = self.overlap.saturating_sub(tag_len);

        let chunks: Vec<Chunk> = split_text(text, capacity, overlap)?
            .into_iter()
            .enumerate()
            .map(|(position, body)| Chunk {
                id: chunk_id(source, position, body),
                source: source.to_string(),
                position: position as u32,
                content: format!("{}{}", tag, body),
            })
            .collect();

        tracing::debug!("{}: {} chunks", source, chunks.len());
        Ok(chunks)
    }
}

/// Split text into trimmed, non-empty pieces of at most `capacity`
/// characters, consecutive pieces sharing up to `overlap` characters.
pub fn split_text(text: &str, capacity: usize, overlap: usize) -> AppResult<Vec<&str>> {
    let config = ChunkConfig::new(capacity)
        .with_overlap(overlap)
        .map_err(|e| AppError::Chunking(format!("Invalid chunking parameters: {}", e)))?;
    let splitter = TextSplitter::new(config);

    Ok(splitter
        .chunks(text)
        .filter(|piece| !piece.trim().is_empty())
        .collect())
}

/// Deterministic chunk identifier.
fn chunk_id(source: &str, position: usize, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0u8]);
    hasher.update((position as u64).to_le_bytes());
    hasher.update([0u8]);
    hasher.update(body.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
