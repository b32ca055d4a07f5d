//! Ollama client: `/api/generate` and `/api/embeddings`.

use std::time::{Duration, Instant};

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
pub struct OllamaClient {
    cfg: ModelConfig,
    http: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    pub fn new(cfg: ModelConfig) -> ProviderResult<Self> {
        cfg.validate()?;
        let http = Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(ProviderError::Transport)?;
        Ok(Self { cfg, http })
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    async fn generate_raw(&self, prompt: &str) -> ProviderResult<String> {
        let url = format!("{}/api/generate", self.cfg.endpoint.trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: self.cfg.temperature, top_p: self.cfg.top_p, num_predict: self.cfg.max_tokens },
        };
        with_backoff(self.cfg.max_retries, Duration::from_millis(250), || async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::from_status(status, &text));
            }
            let parsed: GenerateResponse = resp.json().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            Ok(parsed.response)
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
            None => {
                debug!(len = raw.len(), "ollama: falling back to degraded review response");
                Ok(ReviewResponse::degraded(raw))
            }
        }
    }

    pub async fn get_embedding(&self, text: &str) -> ProviderResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.cfg.endpoint.trim_end_matches('/'));
        let body = EmbeddingsRequest { model: &self.cfg.model, prompt: text };
        with_backoff(self.cfg.max_retries, Duration::from_millis(250), || async {
            let resp = self.http.post(&url).json(&body).send().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(ProviderError::from_status(status, &text));
            }
            let parsed: EmbeddingsResponse = resp.json().await.map_err(|e| ProviderError::from_transport(e, self.cfg.timeout_secs))?;
            Ok(parsed.embedding)
        })
        .await
    }

    pub async fn health_check(&self) -> HealthStatus {
        let started = Instant::now();
        match self.generate_raw("ping").await {
            Ok(_) => HealthStatus::ok("ollama", &self.cfg.endpoint, &self.cfg.model, started.elapsed().as_millis() as u64),
            Err(err) => HealthStatus::fail("ollama", &self.cfg.endpoint, &self.cfg.model, err.to_string()),
        }
    }
}
