//! Stats command handler.
//!
//! Shows what the workspace index contains.

use super::{assistant_config, load_index, print_json};
use campus_core::{config::AppConfig, AppResult};
use clap::Args;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let settings = assistant_config(config)?;
        let stats = load_index(config, &settings)?.stats();

        if self.json {
            print_json(&stats)?;
        } else {
            println!("Documents:  {}", stats.documents.len());
            for name in &stats.documents {
                println!("  - {}", name);
            }
            println!("Chunks:     {}", stats.chunks_count);
            println!("Embedding:  {} ({} dimensions)", stats.embedding, stats.dimensions);
            println!("Built at:   {}", stats.built_at.to_rfc3339());
        }

        Ok(())
    }
}
