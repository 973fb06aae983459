//! Reset command handler.

use campus_core::{config::AppConfig, AppResult};
use clap::Args;

/// Delete the workspace index
#[derive(Args, Debug)]
pub struct ResetCommand {}

impl ResetCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing reset command");

        if campus_knowledge::reset(&config.workspace)? {
            println!("Index removed");
        } else {
            println!("No index to remove");
        }

        Ok(())
    }
}
