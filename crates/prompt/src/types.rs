//! Prompt types for the campus assistant.

use serde::{Deserialize, Serialize};

/// Slot holding the concatenated document chunks.
pub const SLOT_CONTEXT: &str = "context";

/// Slot holding the formatted web points; empty when there are none.
pub const SLOT_WEB_CONTEXT: &str = "web_context";

/// Slot holding the user's question.
pub const SLOT_QUESTION: &str = "question";

/// Every slot a template may reference.
pub const DECLARED_SLOTS: [&str; 3] = [SLOT_CONTEXT, SLOT_WEB_CONTEXT, SLOT_QUESTION];

/// Slots a template must reference.
pub const REQUIRED_SLOTS: [&str; 2] = [SLOT_CONTEXT, SLOT_QUESTION];

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Creator identifier
    #[serde(rename = "createdBy", default)]
    pub created_by: String,

    /// Optional system message sent alongside the rendered template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Template string with Handlebars syntax
    pub template: String,
}

/// Values for the answer template's slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSlots {
    /// Concatenated chunk contents (may be empty)
    pub context: String,

    /// Formatted web points; `None` or blank omits the web section
    pub web_context: Option<String>,

    /// The user's question
    pub question: String,
}

impl PromptSlots {
    pub fn new(context: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            web_context: None,
            question: question.into(),
        }
    }

    pub fn with_web_context(mut self, web_context: impl Into<String>) -> Self {
        self.web_context = Some(web_context.into());
        self
    }

    /// Web context if it carries any text.
    pub fn effective_web_context(&self) -> Option<&str> {
        self.web_context
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Whether the web section was rendered
    #[serde(rename = "webContextIncluded")]
    pub web_context_included: bool,

    /// Size of the document context in characters
    #[serde(rename = "contextChars")]
    pub context_chars: usize,
}
