//! Answer synthesis.
//!
//! Assembles the answer prompt from retrieved chunks and optional web points,
//! calls the generation model once and returns its text together with the
//! evidence it was given.

use crate::config::GenerationConfig;
use crate::rag::web::{format_points, WEB_POINTS_TITLE};
use crate::types::{AnswerResult, ScoredChunk, WebPoints};
use campus_core::{AppError, AppResult};
use campus_llm::{LlmClient, LlmRequest};
use campus_prompt::{PromptSlots, PromptTemplate};
use std::sync::Arc;

/// Turns retrieved evidence into a generated answer.
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    template: PromptTemplate,
    model: String,
    generation: GenerationConfig,
}

impl AnswerSynthesizer {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        template: PromptTemplate,
        model: impl Into<String>,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            llm,
            template,
            model: model.into(),
            generation,
        }
    }

    /// Generate an answer for `question` from `sources` and optional web points.
    ///
    /// No retry: a failed or empty generation is returned as
    /// `AppError::Generation`.
    pub async fn synthesize(
        &self,
        question: &str,
        sources: Vec<ScoredChunk>,
        web: Option<WebPoints>,
    ) -> AppResult<AnswerResult> {
        let context = build_context(&sources);
        let (web_points, web_error) = match web {
            Some(web) => (web.points, web.error),
            None => (Vec::new(), None),
        };
        let web_context = format_points(&web_points, WEB_POINTS_TITLE);

        let prompt = self
            .template
            .render(&PromptSlots::new(context, question).with_web_context(web_context.clone()))?;

        let mut request = LlmRequest::new(prompt.user, self.model.as_str())
            .with_temperature(self.generation.temperature)
            .with_max_tokens(self.generation.max_tokens);
        if let Some(system) = prompt.system {
            request = request.with_system(system);
        }

        tracing::info!(
            "Generating answer with '{}' (model: {}, {} chunks, {} web points)",
            self.llm.provider_name(),
            self.model,
            sources.len(),
            web_points.len()
        );

        let response = self
            .llm
            .complete(&request)
            .await
            .map_err(|e| AppError::Generation(format!("Model request failed: {}", e)))?;

        if response.content.trim().is_empty() {
            return Err(AppError::Generation(format!(
                "Model '{}' returned no content",
                self.model
            )));
        }

        tracing::debug!(
            "Generated {} chars ({} completion tokens)",
            response.content.len(),
            response.usage.completion_tokens
        );

        Ok(AnswerResult {
            answer: response.content,
            sources,
            web_points,
            web_context,
            web_error,
        })
    }
}

/// Chunk contents, provenance tags included, separated by blank lines.
pub fn build_context(sources: &[ScoredChunk]) -> String {
    sources
        .iter()
        .map(|scored| scored.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
