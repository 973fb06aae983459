//! Ingest command handler.
//!
//! Builds the workspace index from one batch of uploaded documents.

use super::{assistant_config, print_json};
use campus_core::{config::AppConfig, AppError, AppResult};
use campus_knowledge::{
    build_index, config::get_index_path, create_provider, load_documents, DocumentExtractor,
};
use clap::Args;
use std::path::PathBuf;

/// Index documents (PDF, text, Markdown)
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Replace an existing index instead of refusing
    #[arg(long)]
    pub replace: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest options: {:?}", self);

        let index_path = get_index_path(&config.workspace);
        if index_path.exists() && !self.replace {
            return Err(AppError::Config(
                "An index already exists for this workspace. Run 'campus reset' or pass --replace."
                    .to_string(),
            ));
        }

        let assistant = assistant_config(config)?;
        let embedder = create_provider(&assistant.embedding)?;
        let documents = load_documents(&self.paths)?;

        let report =
            build_index(&documents, &DocumentExtractor, embedder.as_ref(), &assistant).await?;
        report.index.save(&index_path)?;

        let stats = report.index.stats();
        if self.json {
            let output = serde_json::json!({
                "documents": stats.documents,
                "chunksCount": stats.chunks_count,
                "dimensions": stats.dimensions,
                "embedding": stats.embedding,
                "skipped": report.skipped,
            });
            print_json(&output)?;
        } else {
            println!(
                "Indexed {} documents ({} chunks, {} embeddings)",
                stats.documents.len(),
                stats.chunks_count,
                stats.embedding
            );
            for skipped in &report.skipped {
                println!("Skipped {}: {}", skipped.name, skipped.reason);
            }
        }

        Ok(())
    }
}
