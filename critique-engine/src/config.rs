//! Engine-facing configuration surface.
//!
//! Assembling this from files/env/CLI flags is an external collaborator's
//! job; the engine only needs a concrete, deserializable type to consume.
//! Each sub-struct derives `Default` paired with `#[serde(default)]` so a
//! partial document plus defaults produces a complete config, mirroring
//! `ai-llm-service::config::default_config`'s pattern.

use serde::{Deserialize, Serialize};

use critique_providers::ProviderKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderKind,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderKind::Ollama,
            model: "llama3".to_string(),
            base_url: "http://localhost:11434".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub repo_path: String,
    pub base_branch: String,
    pub ignore_patterns: Vec<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self { repo_path: ".".to_string(), base_branch: "main".to_string(), ignore_patterns: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Minimal,
    Standard,
    Strict,
}

impl Default for Preset {
    fn default() -> Self {
        Preset::Standard
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub min_severity: critique_providers::Severity,
    pub max_issues: Option<u32>,
    pub max_concurrency: usize,
    pub include_globs: Vec<String>,
    /// Wall-clock budget for a whole run; in-flight provider calls are
    /// raced against cancellation once this elapses.
    pub deadline_secs: u64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self { min_severity: critique_providers::Severity::Info, max_issues: None, max_concurrency: 0, include_globs: Vec::new(), deadline_secs: 600 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Json,
    Sarif,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Markdown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub include_code: bool,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: OutputFormat::Markdown, include_code: true, color: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: String,
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true, dir: ".critique-cache".to_string(), ttl_secs: 86_400, max_entries: 10_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub rules_dir: String,
    pub preset: Preset,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self { rules_dir: "rules".to_string(), preset: Preset::Standard }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HebbianConfig {
    pub enabled: bool,
    pub decay_rate: f64,
    pub min_activation: f64,
}

impl Default for HebbianConfig {
    fn default() -> Self {
        Self { enabled: true, decay_rate: 0.05, min_activation: 0.05 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub dir: String,
    pub working_size: usize,
    pub session_ttl_secs: u64,
    pub semantic_search: bool,
    pub hebbian: HebbianConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: ".critique-memory".to_string(),
            working_size: 100,
            session_ttl_secs: 3600,
            semantic_search: false,
            hebbian: HebbianConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub provider: ProviderConfig,
    pub git: GitConfig,
    pub review: ReviewConfig,
    pub output: OutputConfig,
    pub cache: CacheConfig,
    pub rules: RulesConfig,
    pub memory: MemoryConfig,
}

impl EngineConfig {
    /// `0` means "auto": one worker per logical CPU, minimum 1.
    pub fn resolved_concurrency(&self) -> usize {
        if self.review.max_concurrency == 0 {
            num_cpus::get().max(1)
        } else {
            self.review.max_concurrency
        }
    }
}
