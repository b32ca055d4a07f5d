//! Applies a previously-reported fix to the working copy.
//!
//! Reads either an `AggregateResult` (from `review`) or a `CommitAnalysis`
//! (from `commit`/`recall`) JSON dump, locates the named file's issues, and
//! calls `critique_engine::apply_fix` for the selected one(s).

use std::path::Path;

use critique_engine::apply_fix;
use critique_providers::Issue;

fn issues_for_file(raw: &str, file: &str) -> anyhow::Result<Vec<Issue>> {
    if let Ok(aggregate) = serde_json::from_str::<critique_engine::AggregateResult>(raw) {
        return Ok(aggregate
            .files
            .into_iter()
            .find(|f| f.path == file)
            .map(|f| f.response.map(|r| r.issues).unwrap_or_default())
            .unwrap_or_default());
    }
    if let Ok(analysis) = serde_json::from_str::<critique_commits::CommitAnalysis>(raw) {
        return Ok(analysis.files.into_iter().find(|f| f.path == file).map(|f| f.issues).unwrap_or_default());
    }
    anyhow::bail!("{file}: input is neither a recognized AggregateResult nor CommitAnalysis document")
}

pub fn run(from: &Path, file: &str, only_issue: Option<usize>) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(from)?;
    let issues = issues_for_file(&raw, file)?;
    if issues.is_empty() {
        anyhow::bail!("{file}: no recorded issues to fix");
    }

    let target = Path::new(file);
    let mut applied = 0usize;
    for (index, issue) in issues.iter().enumerate() {
        if let Some(wanted) = only_issue {
            if index != wanted {
                continue;
            }
        }
        let Some(location) = &issue.location else { continue };
        let Some(fixed_code) = &issue.fixed_code else { continue };
        let expected = (location.end_line.saturating_sub(location.start_line) + 1) as usize;
        apply_fix(target, location, fixed_code, expected)?;
        applied += 1;
    }
    Ok(applied)
}
