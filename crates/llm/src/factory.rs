//! LLM provider factory.
//!
//! Resolves a provider name into a ready-to-use client.

use crate::client::LlmClient;
use crate::providers::{GroqClient, OllamaClient};
use crate::types::ProviderType;
use campus_core::config::{DEFAULT_GROQ_ENDPOINT, DEFAULT_OLLAMA_ENDPOINT};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by Groq
///
/// # Errors
/// Returns an error if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        ProviderType::Groq => {
            let api_key = api_key
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| "Groq provider requires API key".to_string())?;
            let base_url = endpoint.unwrap_or(DEFAULT_GROQ_ENDPOINT);
            Ok(Arc::new(GroqClient::with_base_url(base_url, api_key)))
        }
    }
}
