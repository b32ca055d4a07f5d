//! Diff data model: files, hunks, lines.
//!
//! Mirrors the provider-agnostic shape used elsewhere in this workspace's
//! lineage, generalized so it no longer assumes a hosted MR/PR provider is
//! the source of the diff.

use serde::{Deserialize, Serialize};

/// Status of a single file within a diff.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Binary,
}

/// One changed line inside a hunk. Content never carries the leading
/// `+`/`-`/` ` marker; that marker only exists on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiffLine {
    Addition { new_line: u32, content: String },
    Deletion { old_line: u32, content: String },
    Context { old_line: u32, new_line: u32, content: String },
}

impl DiffLine {
    pub fn content(&self) -> &str {
        match self {
            DiffLine::Addition { content, .. } => content,
            DiffLine::Deletion { content, .. } => content,
            DiffLine::Context { content, .. } => content,
        }
    }
}

/// A contiguous region of a unified diff described by one `@@ -a,b +c,d @@` header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Number of lines classified as additions (+ context), which callers
    /// must match against the new-hunk span per the diff-model invariant.
    pub fn new_span(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Addition { .. } | DiffLine::Context { .. }))
            .count()
    }

    /// Number of lines classified as deletions (+ context), matched against
    /// the old-hunk span.
    pub fn old_span(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Deletion { .. } | DiffLine::Context { .. }))
            .count()
    }

    pub fn additions(&self) -> usize {
        self.lines.iter().filter(|l| matches!(l, DiffLine::Addition { .. })).count()
    }

    pub fn deletions(&self) -> usize {
        self.lines.iter().filter(|l| matches!(l, DiffLine::Deletion { .. })).count()
    }
}

/// One file's worth of changes within a `Diff`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDiff {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub status: FileStatus,
    /// Binary file-diffs always have an empty hunk list.
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// The path callers should report findings against: new path if present,
    /// else old path (covers pure deletions).
    pub fn display_path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("<unknown>")
    }

    pub fn additions(&self) -> usize {
        self.hunks.iter().map(Hunk::additions).sum()
    }

    pub fn deletions(&self) -> usize {
        self.hunks.iter().map(Hunk::deletions).sum()
    }

    /// Concatenated diff text for this file only: header-free, `+`/`-`/` `
    /// marker reconstructed per line. Used as rule-engine and provider input.
    pub fn to_diff_text(&self) -> String {
        let mut out = String::new();
        for hunk in &self.hunks {
            out.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                hunk.old_start, hunk.old_lines, hunk.new_start, hunk.new_lines
            ));
            for line in &hunk.lines {
                match line {
                    DiffLine::Addition { content, .. } => out.push_str(&format!("+{content}\n")),
                    DiffLine::Deletion { content, .. } => out.push_str(&format!("-{content}\n")),
                    DiffLine::Context { content, .. } => out.push_str(&format!(" {content}\n")),
                }
            }
        }
        out
    }
}

/// Ordered sequence of file-diffs produced by one acquisition + parse pass.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Diff {
    pub files: Vec<FileDiff>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
