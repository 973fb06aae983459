//! Prompt builder: slot validation and Handlebars rendering.

use crate::types::{
    BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptSlots, DECLARED_SLOTS,
    REQUIRED_SLOTS, SLOT_CONTEXT, SLOT_QUESTION, SLOT_WEB_CONTEXT,
};
use campus_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Built-in answer template.
///
/// The web section is rendered only when `web_context` is non-empty.
pub const DEFAULT_ANSWER_TEMPLATE: &str = r#"You are a helpful campus assistant.

Instructions:
1. Answer from the campus document context first.
2. Use the web search results only to supplement the documents.
3. Never make up information.
4. If the answer is not in the context, say exactly: "Not available in uploaded documents".
5. Keep the response clear and organized.
6. Use bullet points when listing multiple items.
7. Always cite the document the answer comes from.

Campus Document Context:
{{context}}
{{#if web_context}}

Web Search Results:
{{web_context}}
{{/if}}

User Question:
{{question}}

Answer (cite sources, use bullet points):"#;

/// Words inside `{{ }}` that are Handlebars syntax rather than slot names.
const TEMPLATE_KEYWORDS: [&str; 6] = ["if", "unless", "else", "each", "with", "this"];

/// A validated answer template, compiled once and rendered per question.
pub struct PromptTemplate {
    definition: PromptDefinition,
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("id", &self.definition.id)
            .finish()
    }
}

impl PromptTemplate {
    /// Validate and compile a prompt definition.
    pub fn new(definition: PromptDefinition) -> AppResult<Self> {
        validate_definition(&definition)?;
        validate_slots(&definition.template)?;

        let mut registry = Handlebars::new();
        // Plain text prompt, no HTML escaping
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);
        registry
            .register_template_string(&definition.id, &definition.template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self {
            definition,
            registry,
        })
    }

    /// The built-in answer template.
    pub fn builtin() -> AppResult<Self> {
        Self::new(PromptDefinition {
            id: "answer".to_string(),
            title: "Campus answer".to_string(),
            api_version: "1.0".to_string(),
            created_by: "campus".to_string(),
            system: None,
            template: DEFAULT_ANSWER_TEMPLATE.to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// Render the template with the given slot values.
    ///
    /// Every declared slot is always bound, so strict mode only trips on a
    /// template error, never on an absent web section.
    pub fn render(&self, slots: &PromptSlots) -> AppResult<BuiltPrompt> {
        if slots.question.trim().is_empty() {
            return Err(AppError::Prompt("Question cannot be empty".to_string()));
        }

        let web_context = slots.effective_web_context();
        let mut data: HashMap<&str, &str> = HashMap::new();
        data.insert(SLOT_CONTEXT, slots.context.as_str());
        data.insert(SLOT_WEB_CONTEXT, web_context.unwrap_or(""));
        data.insert(SLOT_QUESTION, slots.question.trim());

        tracing::debug!(
            "Rendering prompt '{}' (context: {} chars, web: {})",
            self.definition.id,
            slots.context.len(),
            web_context.is_some()
        );

        let user = self
            .registry
            .render(&self.definition.id, &data)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        Ok(BuiltPrompt {
            system: self.definition.system.clone(),
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id: self.definition.id.clone(),
                web_context_included: web_context.is_some(),
                context_chars: slots.context.chars().count(),
            },
        })
    }
}

/// Slot names referenced by a template, in first-seen order.
pub fn referenced_slots(template: &str) -> Vec<String> {
    let mut slots: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let expr = after[..end]
            .trim_matches(|c: char| c == '{' || c == '}' || c == '~' || c == '&')
            .trim();
        rest = &after[end + 2..];

        // Comments and block closers name nothing new
        if expr.starts_with('!') || expr.starts_with('/') {
            continue;
        }

        for token in expr.trim_start_matches(['#', '^']).split_whitespace() {
            if TEMPLATE_KEYWORDS.contains(&token)
                || token.starts_with('"')
                || token.starts_with('\'')
                || token.parse::<f64>().is_ok()
            {
                continue;
            }
            let name = token.trim_start_matches("./");
            let name = name.split('.').next().unwrap_or(name);
            if !name.is_empty() && !slots.iter().any(|s| s == name) {
                slots.push(name.to_string());
            }
        }
    }

    slots
}

/// Check required and undeclared slot references.
fn validate_slots(template: &str) -> AppResult<()> {
    let slots = referenced_slots(template);

    for required in REQUIRED_SLOTS {
        if !slots.iter().any(|s| s == required) {
            return Err(AppError::Prompt(format!(
                "Template must reference the '{}' slot",
                required
            )));
        }
    }

    if let Some(unknown) = slots.iter().find(|s| !DECLARED_SLOTS.contains(&s.as_str())) {
        return Err(AppError::Prompt(format!(
            "Template references undeclared slot '{}'. Declared: {}",
            unknown,
            DECLARED_SLOTS.join(", ")
        )));
    }

    Ok(())
}

/// Validate a prompt definition's metadata fields.
pub(crate) fn validate_definition(def: &PromptDefinition) -> AppResult<()> {
    if def.id.trim().is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.trim().is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
