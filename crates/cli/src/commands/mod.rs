//! Command handlers for the campus CLI.

pub mod ask;
pub mod ingest;
pub mod reset;
pub mod stats;

pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use reset::ResetCommand;
pub use stats::StatsCommand;

use campus_core::{config::AppConfig, AppResult};
use campus_knowledge::{config::get_index_path, AssistantConfig, VectorIndex};

/// Pipeline settings for the configured workspace.
pub(crate) fn assistant_config(config: &AppConfig) -> AppResult<AssistantConfig> {
    AssistantConfig::load(&config.workspace)
}

/// The workspace index, checked against the configured embedder.
pub(crate) fn load_index(
    config: &AppConfig,
    assistant: &AssistantConfig,
) -> AppResult<VectorIndex> {
    VectorIndex::load_for(&get_index_path(&config.workspace), &assistant.embedding)
}

pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
