//! Campus document question answering.
//!
//! Uploaded documents are extracted, chunked and embedded into an immutable
//! in-memory index; questions are answered from the best matching chunks,
//! optionally supplemented with points pulled from a web search.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod parser;
pub mod rag;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::{AssistantConfig, GenerationConfig, WebSearchConfig};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::{IndexBuilder, VectorIndex};
pub use parser::{DocumentExtractor, DocumentKind, TextExtractor};
pub use rag::{AnswerSynthesizer, Retriever, WebPointExtractor, WebSearch};
pub use types::{
    AnswerResult, Chunk, ExtractedDocument, IndexStats, ScoredChunk, SkippedDocument,
    SourceDocument, WebPoints,
};

use campus_core::{AppError, AppResult};
use chunker::Chunker;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// A built index plus the uploads that did not make it in.
#[derive(Debug)]
pub struct BuildReport {
    pub index: VectorIndex,
    pub skipped: Vec<SkippedDocument>,
}

/// Build an index from one upload batch.
///
/// Extraction and chunking failures are isolated per document and reported
/// in `skipped`; the batch fails only when every document fails. An empty
/// batch fails with `AppError::Chunking`.
pub async fn build_index(
    documents: &[SourceDocument],
    extractor: &dyn TextExtractor,
    embedder: &dyn EmbeddingProvider,
    config: &AssistantConfig,
) -> AppResult<BuildReport> {
    let start = Instant::now();
    tracing::info!("Building index from {} documents", documents.len());

    let (extracted, mut skipped) = extract_all(documents, extractor);

    if !documents.is_empty() && extracted.is_empty() {
        let reasons: Vec<String> = skipped
            .iter()
            .map(|s| format!("{} ({})", s.name, s.reason))
            .collect();
        return Err(AppError::Extraction(format!(
            "No text could be extracted from any document: {}",
            reasons.join("; ")
        )));
    }

    let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)?;
    let batch = chunker.chunk_documents(&extracted)?;
    tracing::debug!(
        "Chunked {} documents into {} chunks",
        extracted.len(),
        batch.chunks.len()
    );

    let names = extracted
        .into_iter()
        .map(|d| d.name)
        .filter(|name| !batch.skipped.iter().any(|s| &s.name == name))
        .collect();
    skipped.extend(batch.skipped);

    let index = IndexBuilder::new(embedder, &config.embedding)
        .build(batch.chunks, names)
        .await?;

    tracing::info!(
        "Index built: {} chunks from {} documents ({} skipped) in {:.2}s",
        index.len(),
        index.documents().len(),
        skipped.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(BuildReport { index, skipped })
}

/// Extract every document, keeping the first of any repeated name.
fn extract_all(
    documents: &[SourceDocument],
    extractor: &dyn TextExtractor,
) -> (Vec<ExtractedDocument>, Vec<SkippedDocument>) {
    let mut seen = HashSet::new();
    let mut extracted = Vec::new();
    let mut skipped = Vec::new();

    for document in documents {
        if !seen.insert(document.name.as_str()) {
            tracing::warn!("Skipping duplicate document name: {}", document.name);
            skipped.push(SkippedDocument {
                name: document.name.clone(),
                reason: "duplicate document name".to_string(),
            });
            continue;
        }

        match extractor.extract(&document.name, &document.bytes) {
            Ok(text) => extracted.push(ExtractedDocument {
                name: document.name.clone(),
                text,
            }),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", document.name, e);
                skipped.push(SkippedDocument {
                    name: document.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (extracted, skipped)
}

/// The answering pipeline: retrieve, optionally search the web, synthesize.
///
/// Holds no per-question state; the index is passed in on every call.
pub struct Assistant {
    retriever: Retriever,
    web: Option<WebPointExtractor>,
    synthesizer: AnswerSynthesizer,
}

impl Assistant {
    pub fn new(retriever: Retriever, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            retriever,
            web: None,
            synthesizer,
        }
    }

    pub fn with_web_search(mut self, web: WebPointExtractor) -> Self {
        self.web = Some(web);
        self
    }

    /// Answer `question` against `index` with the default result count.
    pub async fn answer(
        &self,
        index: &VectorIndex,
        question: &str,
        use_web_search: bool,
    ) -> AppResult<AnswerResult> {
        self.answer_k(index, question, use_web_search, self.retriever.top_k())
            .await
    }

    /// Answer `question` from the `k` best chunks.
    ///
    /// Web search failures never fail the answer; they are reported in
    /// `AnswerResult::web_error`.
    pub async fn answer_k(
        &self,
        index: &VectorIndex,
        question: &str,
        use_web_search: bool,
        k: usize,
    ) -> AppResult<AnswerResult> {
        tracing::info!("Answering: {}", question);

        let sources = self.retriever.retrieve_k(index, question, k).await?;

        let web = if use_web_search {
            match &self.web {
                Some(web) => Some(web.lookup(question).await),
                None => {
                    tracing::warn!("Web search requested but not configured");
                    Some(WebPoints::failed("Web search is not configured"))
                }
            }
        } else {
            None
        };

        self.synthesizer.synthesize(question, sources, web).await
    }
}

/// Read uploads from files and directories.
///
/// Directories are walked for supported document kinds; files named
/// explicitly are always read and left to the extractor to accept or skip.
pub fn load_documents(paths: &[PathBuf]) -> AppResult<Vec<SourceDocument>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_file() {
            documents.push(read_document(path)?);
        } else if path.is_dir() {
            let mut files: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| DocumentKind::from_name(n).is_supported())
                        .unwrap_or(false)
                })
                .collect();
            files.sort();

            for file in files {
                documents.push(read_document(&file)?);
            }
        } else {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No such file or directory: {}", path.display()),
            )));
        }
    }

    tracing::debug!("Loaded {} documents", documents.len());
    Ok(documents)
}

fn read_document(path: &Path) -> AppResult<SourceDocument> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let bytes = std::fs::read(path)?;
    Ok(SourceDocument::new(name, bytes))
}

/// Delete the persisted index. Returns whether one existed.
pub fn reset(workspace: &Path) -> AppResult<bool> {
    let index_path = config::get_index_path(workspace);
    if !index_path.exists() {
        return Ok(false);
    }

    std::fs::remove_file(&index_path)?;
    tracing::info!("Removed index at {:?}", index_path);
    Ok(true)
}
