use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Bug,
    Security,
    Performance,
    Style,
    BestPractice,
}

/// On-disk shape of one rule, deserialized straight from YAML. `pattern` is
/// compiled into a `regex::Regex` at load time; see [`Rule::compile`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawRule {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    pub pattern: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub presets: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

/// Immutable, loaded-once rule record. Process-wide immutable after [`crate::Rules::load`].
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    pub rule_type: RuleType,
    pub pattern: regex::Regex,
    pub languages: Vec<String>,
    pub enabled: bool,
    pub presets: Vec<String>,
}

/// A single pattern match against a text blob.
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub rule_type: RuleType,
    pub offset: usize,
    pub matched_text: String,
}
