//! Unified-diff parser: text → ordered [`FileDiff`]s.
//!
//! Splits on `diff --git` block markers, then per block extracts paths and
//! status before delegating hunk/line classification to [`parse_hunks`].
//! Extra or unknown header lines are tolerated and skipped; only truly
//! unrecoverable structure (an `@@` header that doesn't parse) fails the
//! whole parse.

use crate::errors::{DiffResult, ParseError};
use crate::model::{Diff, DiffLine, FileDiff, FileStatus, Hunk};

/// Parses a full unified-diff blob (as produced by `git diff`/`git show`)
/// into an ordered [`Diff`].
pub fn parse_diff(text: &str) -> DiffResult<Diff> {
    let mut files = Vec::new();

    for block in split_blocks(text) {
        if block.trim().is_empty() {
            continue;
        }
        files.push(parse_block(block)?);
    }

    Ok(Diff { files })
}

/// Splits on `diff --git` markers, keeping the marker line as part of each
/// block (needed to re-extract the declared paths).
fn split_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = None;
    let mut last_idx = 0usize;

    for (idx, _) in text.match_indices("diff --git") {
        // Only treat as a marker if it starts a line.
        if idx != 0 && text.as_bytes().get(idx - 1) != Some(&b'\n') {
            continue;
        }
        if let Some(s) = start {
            blocks.push(&text[s..idx]);
        }
        start = Some(idx);
        last_idx = idx;
    }
    match start {
        Some(s) => blocks.push(&text[s..]),
        None if !text.trim().is_empty() => {
            // No `diff --git` marker at all: treat the whole blob as hunks
            // for a single anonymous file (synthetic / hunk-only input).
            blocks.push(text);
        }
        None => {}
    }
    let _ = last_idx;
    blocks
}

fn parse_block(block: &str) -> DiffResult<FileDiff> {
    let mut old_path = None;
    let mut new_path = None;
    let mut is_new = false;
    let mut is_deleted = false;
    let mut is_renamed = false;
    let mut is_binary = false;

    let mut lines = block.lines().peekable();

    if let Some(first) = lines.peek() {
        if first.starts_with("diff --git") {
            if let Some((a, b)) = parse_git_header_paths(first) {
                old_path = Some(a);
                new_path = Some(b);
            }
            lines.next();
        }
    }

    // Header scan: consume mode/rename/binary marker lines until hunks or
    // `---`/`+++` path lines (which are authoritative when present).
    let mut header_lines_consumed = Vec::new();
    while let Some(line) = lines.peek() {
        if line.starts_with("@@") {
            break;
        }
        if line.starts_with("new file mode") {
            is_new = true;
        } else if line.starts_with("deleted file mode") {
            is_deleted = true;
        } else if let Some(rest) = line.strip_prefix("rename from ") {
            is_renamed = true;
            old_path = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("rename to ") {
            is_renamed = true;
            new_path = Some(rest.trim().to_string());
        } else if looks_like_binary_marker(line) {
            is_binary = true;
        } else if let Some(rest) = line.strip_prefix("--- ") {
            if let Some(p) = strip_ab_prefix(rest.trim()) {
                old_path = Some(p);
            }
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            if let Some(p) = strip_ab_prefix(rest.trim()) {
                new_path = Some(p);
            }
        }
        header_lines_consumed.push(*line);
        lines.next();
    }

    let status = if is_binary {
        FileStatus::Binary
    } else if is_renamed {
        FileStatus::Renamed
    } else if is_new {
        FileStatus::Added
    } else if is_deleted {
        FileStatus::Deleted
    } else {
        FileStatus::Modified
    };

    let remainder: String = {
        let mut s = String::new();
        for l in lines {
            s.push_str(l);
            s.push('\n');
        }
        s
    };

    let hunks = if is_binary {
        Vec::new()
    } else {
        parse_hunks(&remainder)?
    };

    Ok(FileDiff { old_path, new_path, status, hunks })
}

fn looks_like_binary_marker(line: &str) -> bool {
    line.starts_with("GIT binary patch")
        || line.starts_with("Binary files ")
        || (line.starts_with("Files ") && line.contains(" differ"))
}

/// Extracts `(old, new)` paths from a `diff --git a/x b/y` header line.
/// Tolerates paths containing spaces by splitting once on the known
/// `a/`/`b/` prefixes rather than on whitespace alone.
fn parse_git_header_paths(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("diff --git ")?;
    let a_idx = rest.find(" b/")?;
    let a_part = &rest[..a_idx];
    let b_part = &rest[a_idx + 1..];
    let a = a_part.strip_prefix("a/").unwrap_or(a_part).to_string();
    let b = b_part.strip_prefix("b/").unwrap_or(b_part).to_string();
    Some((a, b))
}

fn strip_ab_prefix(path: &str) -> Option<String> {
    if path == "/dev/null" {
        return None;
    }
    Some(
        path.strip_prefix("a/")
            .or_else(|| path.strip_prefix("b/"))
            .unwrap_or(path)
            .to_string(),
    )
}

/// Parses the hunk region of a single file block: enters a hunk on `@@`,
/// then classifies each subsequent line by its first byte.
fn parse_hunks(text: &str) -> DiffResult<Vec<Hunk>> {
    let mut hunks = Vec::new();
    let mut cur: Option<Hunk> = None;
    let mut old_line = 0u32;
    let mut new_line = 0u32;

    for line in text.lines() {
        if let Some(header) = line.strip_prefix("@@") {
            if let Some(h) = cur.take() {
                hunks.push(h);
            }
            let (old_start, old_lines, new_start, new_lines) = parse_hunk_header(header)?;
            old_line = old_start;
            new_line = new_start;
            cur = Some(Hunk { old_start, old_lines, new_start, new_lines, lines: Vec::new() });
            continue;
        }

        // `\ No newline at end of file` and similar marker lines.
        if line.starts_with("\\ ") {
            continue;
        }

        let Some(hunk) = cur.as_mut() else {
            // Prelude before the first `@@`; tolerated and skipped.
            continue;
        };

        if let Some(rest) = line.strip_prefix('+') {
            hunk.lines.push(DiffLine::Addition { new_line, content: rest.to_string() });
            new_line += 1;
        } else if let Some(rest) = line.strip_prefix('-') {
            hunk.lines.push(DiffLine::Deletion { old_line, content: rest.to_string() });
            old_line += 1;
        } else if let Some(rest) = line.strip_prefix(' ') {
            hunk.lines.push(DiffLine::Context { old_line, new_line, content: rest.to_string() });
            old_line += 1;
            new_line += 1;
        } else if line.starts_with("+++") || line.starts_with("---") {
            // Not content; ignore if it leaked into the hunk region.
            continue;
        } else {
            // No marker at all on a line within a hunk: preserve it verbatim
            // as context, covering trailing partial lines with no final
            // newline.
            hunk.lines.push(DiffLine::Context { old_line, new_line, content: line.to_string() });
            old_line += 1;
            new_line += 1;
        }
    }

    if let Some(h) = cur.take() {
        hunks.push(h);
    }

    Ok(hunks)
}

fn parse_hunk_header(header: &str) -> DiffResult<(u32, u32, u32, u32)> {
    let body = header.trim().trim_end_matches('@').trim();
    let (left, right) = body
        .split_once('+')
        .ok_or_else(|| ParseError::InvalidHunkHeader(header.to_string()))?;
    let left = left.trim().trim_start_matches('-');
    let right = right.trim();
    let (old_start, old_lines) = split_range(left)
        .ok_or_else(|| ParseError::InvalidHunkHeader(header.to_string()))?;
    let (new_start, new_lines) = split_range(right)
        .ok_or_else(|| ParseError::InvalidHunkHeader(header.to_string()))?;
    Ok((old_start, old_lines, new_start, new_lines))
}

/// Splits `"12,7"` or `"12"` into `(start, len)`; bare start implies len 1.
fn split_range(s: &str) -> Option<(u32, u32)> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some((a, b)) = s.split_once(',') {
        Some((a.parse().ok()?, b.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "diff --git a/src/lib.rs b/src/lib.rs\nindex 111..222 100644\n--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1,3 +1,4 @@\n fn main() {\n-    old();\n+    new();\n+    extra();\n }\n";

    #[test]
    fn parses_single_modified_file() {
        let diff = parse_diff(SAMPLE).unwrap();
        assert_eq!(diff.files.len(), 1);
        let f = &diff.files[0];
        assert_eq!(f.status, FileStatus::Modified);
        assert_eq!(f.new_path.as_deref(), Some("src/lib.rs"));
        assert_eq!(f.hunks.len(), 1);
        assert_eq!(f.hunks[0].additions(), 2);
        assert_eq!(f.hunks[0].deletions(), 1);
    }

    #[test]
    fn hunk_spans_match_declared_counts() {
        let diff = parse_diff(SAMPLE).unwrap();
        let h = &diff.files[0].hunks[0];
        assert_eq!(h.new_span(), h.lines.iter().filter(|l| !matches!(l, DiffLine::Deletion { .. })).count());
        assert_eq!(h.old_span(), h.lines.iter().filter(|l| !matches!(l, DiffLine::Addition { .. })).count());
    }

    #[test]
    fn detects_new_file() {
        let text = "diff --git a/new.txt b/new.txt\nnew file mode 100644\nindex 000..111\n--- /dev/null\n+++ b/new.txt\n@@ -0,0 +1,2 @@\n+hello\n+world\n";
        let diff = parse_diff(text).unwrap();
        assert_eq!(diff.files[0].status, FileStatus::Added);
        assert!(diff.files[0].old_path.is_none());
    }

    #[test]
    fn detects_deleted_file() {
        let text = "diff --git a/gone.txt b/gone.txt\ndeleted file mode 100644\nindex 111..000\n--- a/gone.txt\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-hello\n-world\n";
        let diff = parse_diff(text).unwrap();
        assert_eq!(diff.files[0].status, FileStatus::Deleted);
        assert!(diff.files[0].new_path.is_none());
    }

    #[test]
    fn pure_rename_has_no_hunks() {
        let text = "diff --git a/old_name.rs b/new_name.rs\nsimilarity index 100%\nrename from old_name.rs\nrename to new_name.rs\n";
        let diff = parse_diff(text).unwrap();
        assert_eq!(diff.files[0].status, FileStatus::Renamed);
        assert!(diff.files[0].hunks.is_empty());
    }

    #[test]
    fn binary_file_has_no_hunks() {
        let text = "diff --git a/img.png b/img.png\nindex 111..222 100644\nGIT binary patch\nliteral 10\nabcdefghij\n";
        let diff = parse_diff(text).unwrap();
        assert_eq!(diff.files[0].status, FileStatus::Binary);
        assert!(diff.files[0].hunks.is_empty());
    }

    #[test]
    fn rejects_malformed_hunk_header() {
        let text = "diff --git a/f.rs b/f.rs\n--- a/f.rs\n+++ b/f.rs\n@@ not a header @@\n+x\n";
        assert!(parse_diff(text).is_err());
    }

    #[test]
    fn multi_file_diff_preserves_order() {
        let text = format!("{SAMPLE}{}", "diff --git a/b.rs b/b.rs\n--- a/b.rs\n+++ b/b.rs\n@@ -1 +1 @@\n-a\n+b\n");
        let diff = parse_diff(&text).unwrap();
        assert_eq!(diff.files.len(), 2);
        assert_eq!(diff.files[0].new_path.as_deref(), Some("src/lib.rs"));
        assert_eq!(diff.files[1].new_path.as_deref(), Some("b.rs"));
    }
}
