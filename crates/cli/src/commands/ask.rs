//! Ask command handler.
//!
//! Answers one question from the workspace index, optionally with web points.

use super::{assistant_config, load_index, print_json};
use campus_core::{config::AppConfig, AppError, AppResult};
use campus_knowledge::{
    create_provider, AnswerResult, AnswerSynthesizer, Assistant, Retriever, WebPointExtractor,
};
use campus_llm::create_client;
use campus_prompt::resolve_answer_template;
use clap::Args;

/// Ask a question about the ingested documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Supplement the documents with web search results
    #[arg(long)]
    pub web: bool,

    /// Number of document chunks to use as context
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask options: {:?}", self);

        config.validate()?;

        let settings = assistant_config(config)?;
        let index = load_index(config, &settings)?;

        let embedder = create_provider(&settings.embedding)?;
        let retriever = Retriever::new(embedder, settings.top_k);

        let endpoint = config.endpoint_for(&config.provider);
        let api_key = config.resolve_api_key(&config.provider);
        let client = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
            .map_err(AppError::Config)?;

        let template = resolve_answer_template(&config.workspace)?;
        let synthesizer = AnswerSynthesizer::new(
            client,
            template,
            config.model.as_str(),
            settings.generation.clone(),
        );

        let mut assistant = Assistant::new(retriever, synthesizer);
        if self.web {
            assistant =
                assistant.with_web_search(WebPointExtractor::duckduckgo(settings.web_search.clone())?);
        }

        let k = self.top_k.unwrap_or(settings.top_k);
        let result = assistant.answer_k(&index, &self.question, self.web, k).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": result.answer,
                "provider": config.provider,
                "model": config.model,
                "sources": result.sources,
                "webPoints": result.web_points,
                "webError": result.web_error,
            });
            print_json(&output)?;
        } else {
            print_answer(&result);
        }

        Ok(())
    }
}

fn print_answer(result: &AnswerResult) {
    println!("{}", result.answer);

    if !result.web_context.is_empty() {
        println!();
        print!("{}", result.web_context);
    }

    if !result.sources.is_empty() {
        println!();
        println!("Sources:");
        for scored in &result.sources {
            println!(
                "  - {} (part {}, score {:.3})",
                scored.chunk.source,
                scored.chunk.position + 1,
                scored.score
            );
        }
    }

    if let Some(ref error) = result.web_error {
        tracing::warn!("Web search unavailable: {}", error);
    }
}
