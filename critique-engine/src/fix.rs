//! Applies a provider-suggested fix to the working copy.
//!
//! Resolves the drift open question: rather than trusting the `Issue`'s line
//! numbers blindly against whatever the file currently contains, the target
//! file is re-read immediately before writing and re-sliced at
//! `[start_line..end_line]`; if the slice's line count no longer matches
//! what the issue was generated against, the write is aborted with
//! `FixError::TargetDrifted` instead of corrupting an unrelated region.
//! This subsumes a pure dry-run check — a caller wanting dry-run behavior
//! simply skips the write after a successful drift check.

use std::path::Path;

use thiserror::Error;

use critique_providers::SourceLocation;

pub type FixResult<T> = Result<T, FixError>;

#[derive(Debug, Error)]
pub enum FixError {
    #[error("target file changed since the issue was generated: expected {expected} lines in [{start}..{end}], found {actual}")]
    TargetDrifted { start: u32, end: u32, expected: usize, actual: usize },

    #[error("issue carries no fixed code to apply")]
    NoFixedCode,

    #[error("issue carries no source location")]
    NoLocation,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Re-reads `path`, re-slices `[location.start_line..=location.end_line]`
/// (1-indexed, inclusive), and replaces that span with `fixed_code` only if
/// the slice's current line count equals `expected_line_count`.
pub fn apply_fix(path: &Path, location: &SourceLocation, fixed_code: &str, expected_line_count: usize) -> FixResult<()> {
    let contents = std::fs::read_to_string(path)?;
    let mut lines: Vec<&str> = contents.lines().collect();

    let start_idx = location.start_line.saturating_sub(1) as usize;
    let end_idx = location.end_line as usize;
    let actual = lines.get(start_idx..end_idx.min(lines.len())).map(|s| s.len()).unwrap_or(0);

    if actual != expected_line_count || end_idx > lines.len() {
        return Err(FixError::TargetDrifted { start: location.start_line, end: location.end_line, expected: expected_line_count, actual });
    }

    let replacement: Vec<&str> = fixed_code.lines().collect();
    lines.splice(start_idx..end_idx, replacement);

    let had_trailing_newline = contents.ends_with('\n');
    let mut new_contents = lines.join("\n");
    if had_trailing_newline {
        new_contents.push('\n');
    }
    std::fs::write(path, new_contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(start: u32, end: u32) -> SourceLocation {
        SourceLocation { path: "f.rs".to_string(), start_line: start, end_line: end, start_column: None, end_column: None }
    }

    #[test]
    fn replaces_matching_span() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.rs");
        std::fs::write(&path, "fn a() {}\nfn b() {}\nfn c() {}\n").unwrap();

        apply_fix(&path, &location(2, 2), "fn b() { /* fixed */ }", 1).unwrap();

        let result = std::fs::read_to_string(&path).unwrap();
        assert_eq!(result, "fn a() {}\nfn b() { /* fixed */ }\nfn c() {}\n");
    }

    #[test]
    fn drift_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.rs");
        std::fs::write(&path, "fn a() {}\n").unwrap();

        let err = apply_fix(&path, &location(1, 3), "replacement", 3).unwrap_err();
        assert!(matches!(err, FixError::TargetDrifted { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn a() {}\n");
    }
}
