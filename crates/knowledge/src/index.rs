//! In-memory vector index over chunk embeddings.
//!
//! Built once per upload batch and never mutated afterward. One vector per
//! chunk, all of the same dimensionality, computed eagerly at build time.
//! The index can be saved to and loaded from JSON together with the
//! embedding configuration that produced it.

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use crate::types::{Chunk, IndexStats, ScoredChunk};
use campus_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable similarity index: chunks plus their vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    embedding: EmbeddingConfig,
    documents: Vec<String>,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    built_at: DateTime<Utc>,
}

impl VectorIndex {
    /// An index with no chunks. Searching it returns nothing.
    pub fn empty(embedding: EmbeddingConfig) -> Self {
        Self {
            embedding,
            documents: Vec::new(),
            chunks: Vec::new(),
            vectors: Vec::new(),
            built_at: Utc::now(),
        }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// One vector per chunk, same order as [`VectorIndex::chunks`].
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Names of the documents in the index, in upload order.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.dimensions
    }

    /// Top-k chunks by cosine similarity, best first.
    ///
    /// Ties keep chunk order. Returns `min(k, len)` results.
    pub fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<ScoredChunk>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimensions() {
            return Err(AppError::Index(format!(
                "Query vector has {} dimensions, index has {}",
                query.len(),
                self.dimensions()
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, vector)| {
                let score = cosine_similarity(query, vector);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        // Stable: equal scores stay in chunk order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                score,
            })
            .collect())
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            documents: self.documents.clone(),
            chunks_count: self.chunks.len(),
            dimensions: self.dimensions(),
            embedding: format!("{}/{}", self.embedding.provider, self.embedding.model),
            built_at: self.built_at,
        }
    }

    /// Write the index as JSON.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(self)?;
        std::fs::write(path, json).map_err(|e| {
            AppError::Index(format!("Failed to write index to {:?}: {}", path, e))
        })?;

        tracing::debug!("Saved index with {} chunks to {:?}", self.len(), path);
        Ok(())
    }

    /// Read an index written by [`VectorIndex::save`].
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::Index(format!(
                "No index found at {:?}. Ingest documents first.",
                path
            )));
        }

        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Index(format!("Failed to read index {:?}: {}", path, e)))?;
        let index: Self = serde_json::from_str(&json)
            .map_err(|e| AppError::Index(format!("Corrupt index {:?}: {}", path, e)))?;

        index.check_shape()?;
        tracing::debug!("Loaded index with {} chunks from {:?}", index.len(), path);
        Ok(index)
    }

    /// Load an index and make sure it was built with `expected` embeddings.
    pub fn load_for(path: &Path, expected: &EmbeddingConfig) -> AppResult<Self> {
        let index = Self::load(path)?;
        index.embedding.validate_consistency(expected)?;
        Ok(index)
    }

    fn check_shape(&self) -> AppResult<()> {
        if self.vectors.len() != self.chunks.len() {
            return Err(AppError::Index(format!(
                "Index has {} vectors for {} chunks",
                self.vectors.len(),
                self.chunks.len()
            )));
        }
        if let Some(bad) = self.vectors.iter().find(|v| v.len() != self.dimensions()) {
            return Err(AppError::Index(format!(
                "Index vector has {} dimensions, expected {}",
                bad.len(),
                self.dimensions()
            )));
        }
        Ok(())
    }
}

/// Embeds chunks in batches and assembles a [`VectorIndex`].
pub struct IndexBuilder<'a> {
    embedder: &'a dyn EmbeddingProvider,
    config: &'a EmbeddingConfig,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a dyn EmbeddingProvider, config: &'a EmbeddingConfig) -> Self {
        Self { embedder, config }
    }

    /// Embed every chunk and build the index.
    ///
    /// Each batch is sent once; any embedding failure aborts the build.
    pub async fn build(&self, chunks: Vec<Chunk>, documents: Vec<String>) -> AppResult<VectorIndex> {
        if chunks.is_empty() {
            return Err(AppError::Index("Cannot build an index from zero chunks".to_string()));
        }

        let dimensions = self.embedder.dimensions();
        if dimensions != self.config.dimensions {
            return Err(AppError::Index(format!(
                "Embedder '{}' produces {} dimensions, configuration says {}",
                self.embedder.provider_name(),
                dimensions,
                self.config.dimensions
            )));
        }

        tracing::info!(
            "Embedding {} chunks with '{}' (model: {})",
            chunks.len(),
            self.embedder.provider_name(),
            self.embedder.model_name()
        );

        let batch_size = self.config.batch_size.max(1);
        let mut vectors = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embedded = self
                .embedder
                .embed_batch(&texts)
                .await
                .map_err(into_index_error)?;

            if embedded.len() != batch.len() {
                return Err(AppError::Index(format!(
                    "Embedder returned {} vectors for {} chunks",
                    embedded.len(),
                    batch.len()
                )));
            }
            if let Some(bad) = embedded.iter().find(|v| v.len() != dimensions) {
                return Err(AppError::Index(format!(
                    "Embedder returned a {}-dimensional vector, expected {}",
                    bad.len(),
                    dimensions
                )));
            }

            vectors.extend(embedded);
        }

        tracing::debug!("Built {} vectors of dimension {}", vectors.len(), dimensions);

        Ok(VectorIndex {
            embedding: self.config.clone(),
            documents,
            chunks,
            vectors,
            built_at: Utc::now(),
        })
    }
}

/// Embedding failures are infrastructure failures of the index.
pub(crate) fn into_index_error(err: AppError) -> AppError {
    match err {
        AppError::Index(_) => err,
        other => AppError::Index(format!("Embedding failed: {}", other)),
    }
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::types::provenance_tag;
    use tempfile::TempDir;

    /// Embedder that maps each text to a fixed vector by a keyword.
    #[derive(Debug)]
    struct KeywordEmbedder {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        fn provider_name(&self) -> &str {
            "keyword"
        }
        fn model_name(&self) -> &str {
            "keyword-v1"
        }
        fn dimensions(&self) -> usize {
            2
        }
        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| if t.contains("library") { vec![1.0, 0.0] } else { vec![0.0, 1.0] })
                .collect())
        }
    }

    #[derive(Debug)]
    struct FailingEmbedder;

    #[async_trait::async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        fn provider_name(&self) -> &str {
            "failing"
        }
        fn model_name(&self) -> &str {
            "none"
        }
        fn dimensions(&self) -> usize {
            2
        }
        async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Err(AppError::Llm("connection refused".to_string()))
        }
    }

    fn keyword_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "keyword".to_string(),
            model: "keyword-v1".to_string(),
            dimensions: 2,
            batch_size: 2,
            ..Default::default()
        }
    }

    fn chunk(source: &str, position: u32, body: &str) -> Chunk {
        Chunk {
            id: format!("{}-{}", source, position),
            source: source.to_string(),
            position,
            content: format!("{}{}", provenance_tag(source), body),
        }
    }

    #[tokio::test]
    async fn test_build_embeds_in_batches() {
        let embedder = KeywordEmbedder {
            calls: Default::default(),
        };
        let config = keyword_config();
        let chunks = vec![
            chunk("a.pdf", 0, "library hours"),
            chunk("a.pdf", 1, "gym hours"),
            chunk("a.pdf", 2, "pool hours"),
        ];

        let index = IndexBuilder::new(&embedder, &config)
            .build(chunks, vec!["a.pdf".to_string()])
            .await
            .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(embedder.calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_build_rejects_empty_chunks() {
        let embedder = KeywordEmbedder {
            calls: Default::default(),
        };
        let config = keyword_config();
        let result = IndexBuilder::new(&embedder, &config).build(vec![], vec![]).await;
        assert!(matches!(result, Err(AppError::Index(_))));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_index_error() {
        let config = keyword_config();
        let result = IndexBuilder::new(&FailingEmbedder, &config)
            .build(vec![chunk("a.pdf", 0, "x")], vec!["a.pdf".to_string()])
            .await;

        match result {
            Err(AppError::Index(msg)) => assert!(msg.contains("connection refused")),
            other => panic!("expected index error, got {:?}", other.map(|i| i.len())),
        }
    }

    #[tokio::test]
    async fn test_dimension_mismatch_with_config() {
        let embedder = TrigramProvider::new(384);
        let config = EmbeddingConfig {
            dimensions: 128,
            ..Default::default()
        };
        let result = IndexBuilder::new(&embedder, &config)
            .build(vec![chunk("a.pdf", 0, "x")], vec![])
            .await;
        assert!(matches!(result, Err(AppError::Index(_))));
    }

    #[tokio::test]
    async fn test_search_orders_by_score_and_keeps_ties_stable() {
        let embedder = KeywordEmbedder {
            calls: Default::default(),
        };
        let config = keyword_config();
        let chunks = vec![
            chunk("a.pdf", 0, "gym"),
            chunk("a.pdf", 1, "library one"),
            chunk("a.pdf", 2, "pool"),
            chunk("a.pdf", 3, "library two"),
        ];
        let index = IndexBuilder::new(&embedder, &config)
            .build(chunks, vec!["a.pdf".to_string()])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let positions: Vec<u32> = results.iter().map(|r| r.chunk.position).collect();
        assert_eq!(positions, vec![1, 3, 0]);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[tokio::test]
    async fn test_search_returns_min_k_len() {
        let embedder = KeywordEmbedder {
            calls: Default::default(),
        };
        let config = keyword_config();
        let index = IndexBuilder::new(&embedder, &config)
            .build(vec![chunk("a.pdf", 0, "library")], vec!["a.pdf".to_string()])
            .await
            .unwrap();

        assert_eq!(index.search(&[1.0, 0.0], 3).unwrap().len(), 1);
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_index_search() {
        let index = VectorIndex::empty(EmbeddingConfig::default());
        assert!(index.search(&[0.5; 7], 3).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch() {
        let embedder = KeywordEmbedder {
            calls: Default::default(),
        };
        let config = keyword_config();
        let index = IndexBuilder::new(&embedder, &config)
            .build(vec![chunk("a.pdf", 0, "library")], vec![])
            .await
            .unwrap();
        assert!(matches!(index.search(&[1.0, 0.0, 0.0], 3), Err(AppError::Index(_))));
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip_validates_embedder() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".campus/index.json");

        let embedder = TrigramProvider::new(384);
        let config = EmbeddingConfig::default();
        let index = IndexBuilder::new(&embedder, &config)
            .build(
                vec![chunk("facilities.pdf", 0, "The library is open 9am to 9pm.")],
                vec!["facilities.pdf".to_string()],
            )
            .await
            .unwrap();
        index.save(&path).unwrap();

        let loaded = VectorIndex::load_for(&path, &config).unwrap();
        assert_eq!(loaded.chunks(), index.chunks());
        assert_eq!(loaded.documents(), &["facilities.pdf".to_string()]);

        let other = EmbeddingConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        };
        assert!(VectorIndex::load_for(&path, &other).is_err());
    }

    #[test]
    fn test_load_missing_index() {
        let temp = TempDir::new().unwrap();
        let result = VectorIndex::load(&temp.path().join("index.json"));
        assert!(matches!(result, Err(AppError::Index(_))));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
