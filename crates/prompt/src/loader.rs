//! Loader for YAML prompt overrides.

use crate::builder::{validate_definition, PromptTemplate};
use crate::types::PromptDefinition;
use campus_core::{AppError, AppResult};
use std::path::Path;

/// Prompt ID of the answer template override (`.campus/prompts/answer.yml`).
pub const ANSWER_PROMPT_ID: &str = "answer";

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `<id>.yml` in `.campus/prompts/`.
///
/// # Example
/// ```no_run
/// use campus_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_definition(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// The answer template for a workspace: the YAML override when present,
/// otherwise the built-in one.
pub fn resolve_answer_template(workspace_path: &Path) -> AppResult<PromptTemplate> {
    if prompt_path(workspace_path, ANSWER_PROMPT_ID).exists() {
        let definition = load_prompt(workspace_path, ANSWER_PROMPT_ID)?;
        return PromptTemplate::new(definition);
    }

    PromptTemplate::builtin()
}

fn prompt_path(workspace_path: &Path, prompt_id: &str) -> std::path::PathBuf {
    workspace_path
        .join(".campus/prompts")
        .join(format!("{}.yml", prompt_id))
}
