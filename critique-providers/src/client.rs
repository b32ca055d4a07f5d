//! Value-level dispatch over provider variants.
//!
//! Mirrors `mr-reviewer::git_providers::ProviderClient`'s enum-over-trait
//! pattern: no `Box<dyn Trait>`, no `async-trait`, every capability method
//! is a `match self { ... }` to the variant's own inherent method.

use tracing::info;

use crate::config::{ModelConfig, ProviderKind};
use crate::errors::ProviderResult;
use crate::gemini::GeminiClient;
use crate::model::{HealthStatus, ReviewRequest, ReviewResponse};
use crate::ollama::OllamaClient;
use crate::openai::OpenAiClient;

#[derive(Debug, Clone)]
pub enum ProviderClient {
    Ollama(OllamaClient),
    OpenAiCompatible(OpenAiClient),
    Gemini(GeminiClient),
}

impl ProviderClient {
    pub fn from_config(cfg: ModelConfig) -> ProviderResult<Self> {
        info!(provider = ?cfg.provider, model = %cfg.model, "providers: constructing client");
        match cfg.provider {
            ProviderKind::Ollama => Ok(Self::Ollama(OllamaClient::new(cfg)?)),
            ProviderKind::OpenAiCompatible => Ok(Self::OpenAiCompatible(OpenAiClient::new(cfg)?)),
            ProviderKind::Gemini => Ok(Self::Gemini(GeminiClient::new(cfg)?)),
        }
    }

    pub async fn review(&self, request: &ReviewRequest) -> ProviderResult<ReviewResponse> {
        match self {
            Self::Ollama(c) => c.review(request).await,
            Self::OpenAiCompatible(c) => c.review(request).await,
            Self::Gemini(c) => c.review(request).await,
        }
    }

    pub async fn generate_commit_message(&self, diff: &str) -> ProviderResult<String> {
        match self {
            Self::Ollama(c) => c.generate_commit_message(diff).await,
            Self::OpenAiCompatible(c) => c.generate_commit_message(diff).await,
            Self::Gemini(c) => c.generate_commit_message(diff).await,
        }
    }

    pub async fn chat(&self, prompt: &str) -> ProviderResult<String> {
        match self {
            Self::Ollama(c) => c.chat(prompt).await,
            Self::OpenAiCompatible(c) => c.chat(prompt).await,
            Self::Gemini(c) => c.chat(prompt).await,
        }
    }

    pub async fn get_embedding(&self, text: &str) -> ProviderResult<Vec<f32>> {
        match self {
            Self::Ollama(c) => c.get_embedding(text).await,
            Self::OpenAiCompatible(c) => c.get_embedding(text).await,
            Self::Gemini(c) => c.get_embedding(text).await,
        }
    }

    pub async fn health_check(&self) -> HealthStatus {
        match self {
            Self::Ollama(c) => c.health_check().await,
            Self::OpenAiCompatible(c) => c.health_check().await,
            Self::Gemini(c) => c.health_check().await,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Ollama(c) => c.model(),
            Self::OpenAiCompatible(c) => c.model(),
            Self::Gemini(c) => c.model(),
        }
    }

    /// No persistent resources are held outside the shared `reqwest::Client`
    /// (which cleans up its connection pool on drop), so this is a no-op
    /// kept to satisfy the capability set's `Close()` contract uniformly.
    pub fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama_cfg() -> ModelConfig {
        ModelConfig {
            provider: ProviderKind::Ollama,
            model: "llama3".into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: 512,
            temperature: 0.2,
            top_p: 0.9,
            timeout_secs: 30,
            max_retries: 1,
        }
    }

    #[test]
    fn from_config_selects_matching_variant() {
        let client = ProviderClient::from_config(ollama_cfg()).unwrap();
        assert!(matches!(client, ProviderClient::Ollama(_)));
    }

    #[test]
    fn openai_compatible_without_api_key_is_rejected() {
        let mut cfg = ollama_cfg();
        cfg.provider = ProviderKind::OpenAiCompatible;
        cfg.endpoint = "https://api.openai.com".into();
        let result = ProviderClient::from_config(cfg);
        assert!(result.is_err());
    }
}
