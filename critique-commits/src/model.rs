use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use critique_providers::{Issue, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedFile {
    pub path: String,
    pub language: String,
    #[serde(default)]
    pub additions: Option<u32>,
    #[serde(default)]
    pub deletions: Option<u32>,
    pub score: Option<u8>,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    ApproveWithComments,
    RequestChanges,
    Block,
}

impl Recommendation {
    /// A single critical issue blocks; any error-level issue requests
    /// changes; warnings-only gets a soft nod; a clean run approves.
    fn from_totals(critical: u32, error: u32, warning: u32) -> Self {
        if critical > 0 {
            Recommendation::Block
        } else if error > 0 {
            Recommendation::RequestChanges
        } else if warning > 0 {
            Recommendation::ApproveWithComments
        } else {
            Recommendation::Approve
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityHistogram {
    pub info: u32,
    pub warning: u32,
    pub error: u32,
    pub critical: u32,
}

impl SeverityHistogram {
    fn record(&mut self, severity: Severity) {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    pub total_files: u32,
    pub total_issues: u32,
    pub severity_histogram: SeverityHistogram,
    pub overall_score: Option<f64>,
    pub recommendation: Recommendation,
}

/// Provider/model/personality/RAG-source context the analysis was produced
/// under, kept alongside the issues so a later `Recall` can explain why a
/// given archive looks the way it does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub provider: String,
    pub model: String,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub modes: Vec<String>,
    #[serde(default)]
    pub rag_sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAnalysis {
    pub commit_hash: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub summary: CommitSummary,
    pub files: Vec<AnalyzedFile>,
    pub context: AnalysisContext,
}

impl CommitAnalysis {
    pub fn from_aggregate(commit_hash: &str, files: &[AnalyzedFile], provider: &str, model: &str) -> Self {
        let mut histogram = SeverityHistogram::default();
        let mut score_sum = 0.0f64;
        let mut score_count = 0u32;
        let mut total_issues = 0u32;

        for file in files {
            if let Some(score) = file.score {
                score_sum += score as f64;
                score_count += 1;
            }
            for issue in &file.issues {
                histogram.record(issue.severity);
                total_issues += 1;
            }
        }

        let summary = CommitSummary {
            total_files: files.len() as u32,
            total_issues,
            recommendation: Recommendation::from_totals(histogram.critical, histogram.error, histogram.warning),
            overall_score: if score_count > 0 { Some(score_sum / score_count as f64) } else { None },
            severity_histogram: histogram,
        };

        Self {
            commit_hash: commit_hash.to_string(),
            message: None,
            author: None,
            author_email: None,
            branch: None,
            analyzed_at: Utc::now(),
            summary,
            files: files.to_vec(),
            context: AnalysisContext { provider: provider.to_string(), model: model.to_string(), personality: None, modes: Vec::new(), rag_sources: Vec::new() },
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut md = format!("# Commit Analysis: {}\n\n", self.commit_hash);
        if let Some(message) = &self.message {
            md.push_str(&format!("**Message:** {message}\n\n"));
        }
        md.push_str(&format!(
            "**Recommendation:** {:?}\n**Total issues:** {}\n**Overall score:** {}\n\n",
            self.summary.recommendation,
            self.summary.total_issues,
            self.summary.overall_score.map(|s| format!("{s:.1}")).unwrap_or_else(|| "n/a".to_string())
        ));
        for file in &self.files {
            md.push_str(&format!("## {}\n", file.path));
            if file.issues.is_empty() {
                md.push_str("No issues.\n\n");
                continue;
            }
            for issue in &file.issues {
                md.push_str(&format!("- [{:?}] {}\n", issue.severity, issue.message));
            }
            md.push('\n');
        }
        md
    }
}

/// Lightweight row returned by `List`, avoiding a full `issues.json` parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub commit_hash: String,
    pub message: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub total_issues: u32,
    pub severity_histogram: SeverityHistogram,
}

impl From<&CommitAnalysis> for ArchiveSummary {
    fn from(analysis: &CommitAnalysis) -> Self {
        Self {
            commit_hash: analysis.commit_hash.clone(),
            message: analysis.message.clone(),
            analyzed_at: analysis.analyzed_at,
            total_issues: analysis.summary.total_issues,
            severity_histogram: analysis.summary.severity_histogram.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecallQuery {
    pub text: Option<String>,
    pub file_path: Option<String>,
    pub author: Option<String>,
    pub severity: Option<Severity>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl RecallQuery {
    pub fn matches(&self, analysis: &CommitAnalysis) -> bool {
        if let Some(text) = &self.text {
            let haystack = analysis.message.as_deref().unwrap_or_default();
            let in_message = haystack.to_lowercase().contains(&text.to_lowercase());
            let in_issues = analysis.files.iter().flat_map(|f| &f.issues).any(|i| i.message.to_lowercase().contains(&text.to_lowercase()));
            if !in_message && !in_issues {
                return false;
            }
        }
        if let Some(path) = &self.file_path {
            if !analysis.files.iter().any(|f| &f.path == path) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if analysis.author.as_deref() != Some(author.as_str()) {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if !analysis.files.iter().flat_map(|f| &f.issues).any(|i| i.severity == severity) {
                return false;
            }
        }
        if let Some(since) = self.since {
            if analysis.analyzed_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if analysis.analyzed_at > until {
                return false;
            }
        }
        true
    }
}
