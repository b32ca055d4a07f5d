//! Rule loading, preset filtering, and matching.
//!
//! `Load` walks a directory of YAML rule files; `ApplyPreset` narrows the
//! loaded set to those enabled and tagged for a preset; `Match` runs every
//! applicable rule's compiled pattern over one file's diff text.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::errors::{RuleError, RuleResult};
use crate::model::{RawRule, Rule, RuleMatch};

/// Built-in preset names; `ApplyPreset` also accepts arbitrary custom tags.
pub const PRESET_MINIMAL: &str = "minimal";
pub const PRESET_STANDARD: &str = "standard";
pub const PRESET_STRICT: &str = "strict";

/// The full set of rules loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    rules: Vec<Rule>,
}

impl Rules {
    /// Loads every `*.yml`/`*.yaml` file under `dir`, compiling each rule's
    /// pattern. Fails with `InvalidRule` naming the offending id on the
    /// first unrecognized pattern or duplicate id.
    pub fn load(dir: &Path) -> RuleResult<Self> {
        let mut rules = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();

        let mut entries: Vec<_> = WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                e.file_type().is_file()
                    && e.path()
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .map(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
                        .unwrap_or(false)
            })
            .collect();
        entries.sort_by_key(|e| e.path().to_path_buf());

        for entry in entries {
            let text = std::fs::read_to_string(entry.path())?;
            let raw: Vec<RawRule> = serde_yml::from_str(&text)?;
            for r in raw {
                if !seen_ids.insert(r.id.clone()) {
                    return Err(RuleError::DuplicateId(r.id));
                }
                let pattern = Regex::new(&r.pattern).map_err(|e| RuleError::InvalidRule {
                    id: r.id.clone(),
                    reason: e.to_string(),
                })?;
                rules.push(Rule {
                    id: r.id,
                    name: r.name,
                    severity: r.severity,
                    rule_type: r.rule_type,
                    pattern,
                    languages: r.languages,
                    enabled: r.enabled,
                    presets: r.presets,
                });
            }
        }

        info!(count = rules.len(), dir = %dir.display(), "rules::load: loaded rule set");
        Ok(Self { rules })
    }

    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the subset whose tags match `preset` and that are enabled.
    /// A rule with no preset tags at all is considered part of every preset
    /// (it applies universally).
    pub fn apply_preset(&self, preset: &str) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.enabled)
            .filter(|r| r.presets.is_empty() || r.presets.iter().any(|p| p == preset))
            .collect()
    }

    /// Runs every applicable rule's pattern over `code`, restricted to rules
    /// that list `language` or declare no language restriction. Matches are
    /// returned in rule-declaration order, then match offset.
    pub fn matches(active: &[&Rule], code: &str, language: &str) -> Vec<RuleMatch> {
        let mut out = Vec::new();
        for rule in active {
            if !rule.languages.is_empty() && !rule.languages.iter().any(|l| l == language) {
                continue;
            }
            for m in rule.pattern.find_iter(code) {
                out.push(RuleMatch {
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    severity: rule.severity,
                    rule_type: rule.rule_type,
                    offset: m.start(),
                    matched_text: m.as_str().to_string(),
                });
            }
        }
        debug!(count = out.len(), language, "rules::matches: pre-filter pass complete");
        out
    }
}
