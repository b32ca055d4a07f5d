//! Gemini-HTTP client: `generateContent` over the public REST shape.
//!
//! No pack example ships a Gemini client; this is built fresh in the same
//! shape as the OpenAI-compatible client (shared `reqwest::Client`,
//! `with_backoff` around each call, same capability set).

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ModelConfig;
use crate::errors::{ProviderError, ProviderResult};
use crate::json_extract::extract_json_object;
use crate::model::{HealthStatus, ReviewRequest, ReviewResponse};
use crate::prompt::build_review_prompt;
use crate::retry::with_backoff;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    cfg: ModelConfig,
    http: Client,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: GeminiEmbedding,
}

#[derive(Deserialize)]
struct GeminiEmbedding {
    values: Vec<f32>,
}

impl GeminiClient {
    pub fn new(cfg: ModelConfig) -> ProviderResult<Self> {
        cfg.validate()?;
        if cfg.api_key.is_none() {
            return Err(ProviderError::Config("gemini provider requires an api_key".into()));
        }
        let http = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(ProviderError::Transport)?;
        Ok(Self { cfg, http })
    }

    fn api_key(&self) -> &str {
        self.cfg.api_key.as_deref().unwrap_or_default()
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    async fn generate_raw(&self, prompt: &str) -> ProviderResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.cfg.endpoint.trim_end_matches('/'),
            self.cfg.model,
            self.api_key()
        );
        let body = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { temperature: self.cfg.temperature, top_p: self.cfg.top_p, max_output_tokens: self.cfg.max_tokens },
        };
        with_backoff(self.cfg.max_retries, Duration::from_millis(250), || async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::from_status(status, &text));
            }
            let parsed: GenerateContentResponse = resp.json().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text)
                .ok_or_else(|| ProviderError::MalformedResponse("no candidates in response".into()))
        })
        .await
    }

    pub async fn chat(&self, prompt: &str) -> ProviderResult<String> {
        self.generate_raw(prompt).await
    }

    pub async fn generate_commit_message(&self, diff: &str) -> ProviderResult<String> {
        let prompt = format!("Write a concise conventional commit message for this diff:\n\n{diff}");
        self.generate_raw(&prompt).await
    }

    pub async fn review(&self, request: &ReviewRequest) -> ProviderResult<ReviewResponse> {
        let prompt = build_review_prompt(request);
        let raw = self.generate_raw(&prompt).await?;
        match extract_json_object(&raw).and_then(|json| serde_json::from_str(json).ok()) {
            Some(response) => Ok(response),
            None => Ok(ReviewResponse::degraded(raw)),
        }
    }

    pub async fn get_embedding(&self, text: &str) -> ProviderResult<Vec<f32>> {
        let url = format!("{}/v1beta/models/{}:embedContent?key={}", self.cfg.endpoint.trim_end_matches('/'), self.cfg.model, self.api_key());
        let body = EmbedContentRequest { content: Content { parts: vec![Part { text }] } };
        with_backoff(self.cfg.max_retries, Duration::from_millis(250), || async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::from_status(status, &text));
            }
            let parsed: EmbedContentResponse = resp.json().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            Ok(parsed.embedding.values)
        })
        .await
    }

    pub async fn health_check(&self) -> HealthStatus {
        let started = Instant::now();
        match self.generate_raw("ping").await {
            Ok(_) => HealthStatus::ok("gemini", &self.cfg.endpoint, &self.cfg.model, started.elapsed().as_millis() as u64),
            Err(err) => HealthStatus::fail("gemini", &self.cfg.endpoint, &self.cfg.model, err.to_string()),
        }
    }
}
