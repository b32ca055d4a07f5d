use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use critique_providers::{Issue, IssueType, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Option<i64>,
    pub commit_hash: Option<String>,
    pub file_path: String,
    pub line: Option<u32>,
    pub severity: Severity,
    pub issue_type: IssueType,
    pub message: String,
    pub suggestion: Option<String>,
    pub author: Option<String>,
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

impl HistoryRecord {
    pub fn from_issue(issue: &Issue, file_path: &str, commit_hash: Option<&str>, branch: Option<&str>) -> Self {
        Self {
            id: None,
            commit_hash: commit_hash.map(str::to_string),
            file_path: file_path.to_string(),
            line: issue.location.as_ref().map(|loc| loc.start_line),
            severity: issue.severity,
            issue_type: issue.issue_type,
            message: issue.message.clone(),
            suggestion: issue.suggestion.clone(),
            author: None,
            branch: branch.map(str::to_string),
            created_at: Utc::now(),
            resolved: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeverityDistribution {
    pub info: u64,
    pub warning: u64,
    pub error: u64,
    pub critical: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDistribution {
    pub bug: u64,
    pub security: u64,
    pub performance: u64,
    pub style: u64,
    pub best_practice: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHistory {
    pub file_path: String,
    pub total: u64,
    pub resolved: u64,
    pub pending: u64,
    pub review_rounds: u64,
    pub first_reviewed_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub severity_distribution: SeverityDistribution,
    pub type_distribution: TypeDistribution,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_records: u64,
    pub total_resolved: u64,
    pub total_pending: u64,
    pub files_touched: u64,
    pub severity_distribution: SeverityDistribution,
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub file_glob: Option<String>,
    pub author: Option<String>,
    pub severity: Option<Severity>,
    pub issue_type: Option<IssueType>,
    pub branch: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub resolved: Option<bool>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: None,
            file_glob: None,
            author: None,
            severity: None,
            issue_type: None,
            branch: None,
            since: None,
            until: None,
            resolved: None,
            limit: 50,
            offset: 0,
        }
    }
}

pub(crate) fn severity_to_str(s: Severity) -> &'static str {
    match s {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
        Severity::Critical => "critical",
    }
}

pub(crate) fn severity_from_str(s: &str) -> Severity {
    match s {
        "warning" => Severity::Warning,
        "error" => Severity::Error,
        "critical" => Severity::Critical,
        _ => Severity::Info,
    }
}

pub(crate) fn issue_type_to_str(t: IssueType) -> &'static str {
    match t {
        IssueType::Bug => "bug",
        IssueType::Security => "security",
        IssueType::Performance => "performance",
        IssueType::Style => "style",
        IssueType::BestPractice => "best_practice",
    }
}

pub(crate) fn issue_type_from_str(s: &str) -> IssueType {
    match s {
        "security" => IssueType::Security,
        "performance" => IssueType::Performance,
        "style" => IssueType::Style,
        "best_practice" => IssueType::BestPractice,
        _ => IssueType::Bug,
    }
}
