//! Similarity retrieval over a built index.

use crate::embeddings::EmbeddingProvider;
use crate::index::{into_index_error, VectorIndex};
use crate::types::ScoredChunk;
use campus_core::AppResult;
use std::sync::Arc;

/// Embeds questions and looks them up in a [`VectorIndex`].
///
/// Read-only: the index is borrowed per call and never mutated.
#[derive(Debug, Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { embedder, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The default number of chunks most similar to `query`.
    pub async fn retrieve(&self, index: &VectorIndex, query: &str) -> AppResult<Vec<ScoredChunk>> {
        self.retrieve_k(index, query, self.top_k).await
    }

    /// The `k` chunks most similar to `query`, best first, ties in chunk order.
    ///
    /// An empty index yields no results and no embedding call.
    pub async fn retrieve_k(
        &self,
        index: &VectorIndex,
        query: &str,
        k: usize,
    ) -> AppResult<Vec<ScoredChunk>> {
        if index.is_empty() {
            tracing::debug!("Index is empty, nothing to retrieve");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await.map_err(into_index_error)?;
        let results = index.search(&query_embedding, k)?;

        if let Some(top) = results.first() {
            tracing::debug!(
                "Retrieved {} chunks (top score: {:.3}, from {})",
                results.len(),
                top.score,
                top.chunk.source
            );
        }

        Ok(results)
    }
}
