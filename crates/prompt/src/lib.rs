//! Answer prompt construction for the campus assistant.
//!
//! This crate provides:
//! - A built-in answer template with named slots (`context`, `web_context`, `question`)
//! - Slot validation for templates, built-in or loaded from YAML
//! - Handlebars rendering into a `BuiltPrompt`

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{referenced_slots, PromptTemplate, DEFAULT_ANSWER_TEMPLATE};
pub use loader::{load_prompt, resolve_answer_template, ANSWER_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptSlots};
