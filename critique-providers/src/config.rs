//! Provider configuration types.
//!
//! Mirrors the shape of a model config that names a provider, endpoint and
//! credential, plus generation knobs, the way a single model config names
//! a provider/endpoint/model and carries its own sampling parameters.

use serde::{Deserialize, Serialize};

use crate::errors::{ProviderError, ProviderResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Ollama,
    OpenAiCompatible,
    Gemini,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.2
}

fn default_top_p() -> f32 {
    0.95
}

fn default_timeout_secs() -> u64 {
    60
}

impl ModelConfig {
    pub fn validate(&self) -> ProviderResult<()> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::Config("model name must not be empty".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ProviderError::Config("endpoint must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ProviderError::Config(format!(
                "temperature {} out of range [0.0, 2.0]",
                self.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ProviderError::Config(format!("top_p {} out of range [0.0, 1.0]", self.top_p)));
        }
        if matches!(self.provider, ProviderKind::OpenAiCompatible | ProviderKind::Gemini) && self.api_key.is_none() {
            return Err(ProviderError::Config(format!("{:?} requires an api_key", self.provider)));
        }
        Ok(())
    }
}
