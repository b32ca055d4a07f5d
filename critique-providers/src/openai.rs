//! OpenAI-compatible client: `/v1/chat/completions` and `/v1/embeddings`.
//! Shared by OpenAI itself, Groq, and any endpoint honoring the same shape.

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::ModelConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::json_extract::extract_json_object;
use crate::model::{HealthStatus, ReviewRequest, ReviewResponse};
use crate::prompt::build_review_prompt;
use crate::retry::with_backoff;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    cfg: ModelConfig,
    http: Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsDatum>,
}

#[derive(Deserialize)]
struct EmbeddingsDatum {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    pub fn new(cfg: ModelConfig) -> ProviderResult<Self> {
        cfg.validate()?;
        let api_key = cfg.api_key.clone().ok_or_else(|| ProviderError::Config("openai-compatible provider requires an api_key".into()))?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| ProviderError::Config(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(ProviderError::Transport)?;
        Ok(Self { cfg, http })
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    async fn chat_raw(&self, prompt: &str, system: Option<&str>) -> ProviderResult<(String, Option<u32>)> {
        let url = format!("{}/v1/chat/completions", self.cfg.endpoint.trim_end_matches('/'));
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: prompt });
        let body = ChatCompletionRequest { model: &self.cfg.model, messages, temperature: self.cfg.temperature, top_p: self.cfg.top_p, max_tokens: self.cfg.max_tokens };

        let started = Instant::now();
        let result = with_backoff(self.cfg.max_retries, Duration::from_millis(250), || async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::from_status(status, &text));
            }
            let parsed: ChatCompletionResponse = resp.json().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))?;
            Ok((content, parsed.usage.map(|u| u.total_tokens)))
        })
        .await;
        debug!(latency_ms = started.elapsed().as_millis(), "openai-compatible: chat completion");
        result
    }

    pub async fn chat(&self, prompt: &str) -> ProviderResult<String> {
        self.chat_raw(prompt, None).await.map(|(content, _)| content)
    }

    pub async fn generate_commit_message(&self, diff: &str) -> ProviderResult<String> {
        let system = "You write concise, conventional-commit-style commit messages.";
        let prompt = format!("Diff:\n\n{diff}");
        self.chat_raw(&prompt, Some(system)).await.map(|(content, _)| content)
    }

    pub async fn review(&self, request: &ReviewRequest) -> ProviderResult<ReviewResponse> {
        let prompt = build_review_prompt(request);
        let (raw, tokens_used) = self.chat_raw(&prompt, None).await?;
        match extract_json_object(&raw).and_then(|json| serde_json::from_str::<ReviewResponse>(json).ok()) {
            Some(mut response) => {
                if response.tokens_used.is_none() {
                    response.tokens_used = tokens_used;
                }
                Ok(response)
            }
            None => Ok(ReviewResponse::degraded(raw)),
        }
    }

    pub async fn get_embedding(&self, text: &str) -> ProviderResult<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.cfg.endpoint.trim_end_matches('/'));
        let body = EmbeddingsRequest { model: &self.cfg.model, input: text };
        with_backoff(self.cfg.max_retries, Duration::from_millis(250), || async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::from_status(status, &text));
            }
            let parsed: EmbeddingsResponse = resp.json().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            parsed.data.into_iter().next().map(|d| d.embedding).ok_or_else(|| ProviderError::MalformedResponse("empty embeddings data".into()))
        })
        .await
    }

    pub async fn health_check(&self) -> HealthStatus {
        let started = Instant::now();
        match self.chat_raw("ping", None).await {
            Ok(_) => HealthStatus::ok("openai-compatible", &self.cfg.endpoint, &self.cfg.model, started.elapsed().as_millis() as u64),
            Err(err) => HealthStatus::fail("openai-compatible", &self.cfg.endpoint, &self.cfg.model, err.to_string()),
        }
    }
}
