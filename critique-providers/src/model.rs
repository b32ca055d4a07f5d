//! Wire-level request/response types for the provider capability set.
//!
//! These live here (rather than in `critique-engine`) because the capability
//! contract `Review(ReviewRequest) -> ReviewResponse` is defined at the
//! provider boundary; the engine depends on this crate for dispatch, not
//! the other way around.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Bug,
    Security,
    Performance,
    Style,
    BestPractice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLocation {
    pub path: String,
    pub start_line: u32,
    pub end_line: u32,
    #[serde(default)]
    pub start_column: Option<u32>,
    #[serde(default)]
    pub end_column: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootCause {
    pub description: String,
    #[serde(default)]
    pub propagation_path: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub fixed_code: Option<String>,
    #[serde(default)]
    pub location: Option<SourceLocation>,
    #[serde(default)]
    pub root_cause: Option<RootCause>,
}

/// Per-file review task. `fingerprint` is a hash over (provider, model,
/// normalized diff payload, language, prompt template version) and is the
/// cache key the engine looks up before dispatching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub file_path: String,
    pub language: String,
    pub diff_payload: String,
    #[serde(default)]
    pub context: Option<String>,
    pub fingerprint: String,
}

/// Per-file review result. Malformed provider output degrades to
/// `issues: []`, `summary: <raw text>`, `score: 70` rather than an error —
/// see `json_extract` and the provider-specific response parsers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub issues: Vec<Issue>,
    pub summary: String,
    pub score: u8,
    #[serde(default)]
    pub tokens_used: Option<u32>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
}

impl ReviewResponse {
    pub const DEGRADED_SCORE: u8 = 70;

    pub fn degraded(raw_text: impl Into<String>) -> Self {
        Self { issues: Vec::new(), summary: raw_text.into(), score: Self::DEGRADED_SCORE, tokens_used: None, processing_time_ms: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: Option<u64>,
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn ok(provider: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>, latency_ms: u64) -> Self {
        Self { provider: provider.into(), endpoint: endpoint.into(), model: model.into(), ok: true, latency_ms: Some(latency_ms), message: None }
    }

    pub fn fail(provider: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>, message: impl Into<String>) -> Self {
        Self { provider: provider.into(), endpoint: endpoint.into(), model: model.into(), ok: false, latency_ms: None, message: Some(message.into()) }
    }
}
