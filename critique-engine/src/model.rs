//! Per-invocation and per-file outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use critique_diff::ReviewMode;
use critique_providers::{Issue, ReviewResponse, Severity};

use crate::errors::FileReviewError;

/// Outcome of reviewing a single file. Exactly one of `response`/`error` is
/// populated; a file whose task never ran (dropped by cancellation) carries
/// `error = Some(Cancelled)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub path: String,
    pub language: String,
    #[serde(default)]
    pub response: Option<ReviewResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub from_cache: bool,
}

impl FileResult {
    pub fn issues(&self) -> &[Issue] {
        self.response.as_ref().map(|r| r.issues.as_slice()).unwrap_or_default()
    }

    pub fn cancelled(path: impl Into<String>, language: impl Into<String>) -> Self {
        Self { path: path.into(), language: language.into(), response: None, error: Some(FileReviewError::Cancelled.to_string()), from_cache: false }
    }

    pub fn failed(path: impl Into<String>, language: impl Into<String>, error: FileReviewError) -> Self {
        Self { path: path.into(), language: language.into(), response: None, error: Some(error.to_string()), from_cache: false }
    }

    pub fn succeeded(path: impl Into<String>, language: impl Into<String>, response: ReviewResponse, from_cache: bool) -> Self {
        Self { path: path.into(), language: language.into(), response: Some(response), error: None, from_cache }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityTotals {
    pub info: u32,
    pub warning: u32,
    pub error: u32,
    pub critical: u32,
}

impl SeverityTotals {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Info => self.info += 1,
            Severity::Warning => self.warning += 1,
            Severity::Error => self.error += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.info + self.warning + self.error + self.critical
    }
}

/// Per-invocation outcome. File order matches the order produced by the
/// parser (and therefore the order in the diff text), not completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub files: Vec<FileResult>,
    pub total_files: u32,
    pub total_issues: u32,
    pub severity_totals: SeverityTotals,
    pub overall_score: Option<f64>,
    pub mode: ReviewMode,
    pub base: Option<String>,
    pub head: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AggregateResult {
    pub fn has_critical_issue(&self) -> bool {
        self.severity_totals.critical > 0
    }
}
