//! Diff acquisition: turns git repository state into unified-diff text,
//! then hands it to [`crate::parser::parse_diff`].
//!
//! Every mode funnels through `git2::Diff::print` so acquisition and parsing
//! share one code path regardless of how the diff was obtained.

use std::path::Path;

use git2::{DiffFormat, DiffOptions, Repository};
use serde::{Deserialize, Serialize};

use crate::errors::DiffResult;
use crate::model::Diff;
use crate::parser::parse_diff;

/// Which review mode produced a diff; carried through to `AggregateResult`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    Staged,
    Commit,
    Branch,
    Files,
}

/// Resolved base/head references for an acquired diff, echoed into
/// `AggregateResult`.
#[derive(Debug, Clone, Default)]
pub struct DiffRefs {
    pub base: Option<String>,
    pub head: Option<String>,
}

/// Renders a `git2::Diff` to unified-diff text via `Diff::print`.
fn render(diff: &git2::Diff<'_>) -> DiffResult<String> {
    let mut buf = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if let Ok(s) = std::str::from_utf8(line.content()) {
            match line.origin() {
                '+' | '-' | ' ' => {
                    buf.push(line.origin());
                    buf.push_str(s);
                }
                _ => buf.push_str(s),
            }
        }
        true
    })?;
    Ok(buf)
}

/// Staged-index snapshot: index vs. `HEAD`'s tree.
pub fn acquire_staged(repo_path: &Path) -> DiffResult<(Diff, DiffRefs)> {
    let repo = Repository::open(repo_path)?;
    let head_tree = repo.head()?.peel_to_tree()?;
    let mut opts = DiffOptions::new();
    let git_diff = repo.diff_tree_to_index(Some(&head_tree), None, Some(&mut opts))?;
    let text = render(&git_diff)?;
    let refs = DiffRefs { base: Some(head_tree.id().to_string()), head: None };
    Ok((parse_diff(&text)?, refs))
}

/// Single commit vs. its first parent.
pub fn acquire_commit(repo_path: &Path, commit_ref: &str) -> DiffResult<(Diff, DiffRefs)> {
    let repo = Repository::open(repo_path)?;
    let commit = resolve_commit(&repo, commit_ref)?;
    let tree = commit.tree()?;
    let parent_tree = commit.parent(0).ok().map(|p| p.tree()).transpose()?;
    let mut opts = DiffOptions::new();
    let git_diff =
        repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
    let text = render(&git_diff)?;
    let refs = DiffRefs {
        base: parent_tree.as_ref().map(|t| t.id().to_string()),
        head: Some(commit.id().to_string()),
    };
    Ok((parse_diff(&text)?, refs))
}

/// Commit range `from..to`: `from`'s tree vs. `to`'s tree.
pub fn acquire_range(repo_path: &Path, from: &str, to: &str) -> DiffResult<(Diff, DiffRefs)> {
    let repo = Repository::open(repo_path)?;
    let from_commit = resolve_commit(&repo, from)?;
    let to_commit = resolve_commit(&repo, to)?;
    let from_tree = from_commit.tree()?;
    let to_tree = to_commit.tree()?;
    let mut opts = DiffOptions::new();
    let git_diff = repo.diff_tree_to_tree(Some(&from_tree), Some(&to_tree), Some(&mut opts))?;
    let text = render(&git_diff)?;
    let refs = DiffRefs {
        base: Some(from_commit.id().to_string()),
        head: Some(to_commit.id().to_string()),
    };
    Ok((parse_diff(&text)?, refs))
}

/// Branch vs. base, three-dot semantics: merge-base(base, HEAD) vs. HEAD.
pub fn acquire_branch(repo_path: &Path, base_branch: &str) -> DiffResult<(Diff, DiffRefs)> {
    let repo = Repository::open(repo_path)?;
    let head = repo.head()?.peel_to_commit()?;
    let base_obj = repo.revparse_single(base_branch)?;
    let base_commit = base_obj.peel_to_commit()?;
    let merge_base_oid = repo.merge_base(head.id(), base_commit.id())?;
    let merge_base = repo.find_commit(merge_base_oid)?;

    let base_tree = merge_base.tree()?;
    let head_tree = head.tree()?;
    let mut opts = DiffOptions::new();
    let git_diff = repo.diff_tree_to_tree(Some(&base_tree), Some(&head_tree), Some(&mut opts))?;
    let text = render(&git_diff)?;
    let refs = DiffRefs {
        base: Some(merge_base.id().to_string()),
        head: Some(head.id().to_string()),
    };
    Ok((parse_diff(&text)?, refs))
}

/// Explicit file list: each path's on-disk contents become a synthetic
/// added-file diff, bypassing git entirely.
pub fn acquire_files(paths: &[std::path::PathBuf]) -> DiffResult<(Diff, DiffRefs)> {
    use crate::model::{DiffLine, FileDiff, FileStatus, Hunk};

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        let line_count = content.lines().count() as u32;
        let lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| DiffLine::Addition { new_line: i as u32 + 1, content: l.to_string() })
            .collect();
        let hunks = if line_count == 0 {
            Vec::new()
        } else {
            vec![Hunk { old_start: 0, old_lines: 0, new_start: 1, new_lines: line_count, lines }]
        };
        files.push(FileDiff {
            old_path: None,
            new_path: Some(path.to_string_lossy().into_owned()),
            status: FileStatus::Added,
            hunks,
        });
    }
    Ok((Diff { files }, DiffRefs::default()))
}

fn resolve_commit<'a>(repo: &'a Repository, spec: &str) -> DiffResult<git2::Commit<'a>> {
    let obj = repo.revparse_single(spec)?;
    Ok(obj.peel_to_commit()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        (dir, repo)
    }

    fn commit_all(repo: &Repository, message: &str) -> git2::Oid {
        let mut index = repo.index().unwrap();
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = repo.signature().unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap()
    }

    #[test]
    fn acquire_staged_with_no_changes_is_empty() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        commit_all(&repo, "initial");

        let (diff, _refs) = acquire_staged(dir.path()).unwrap();
        assert!(diff.files.is_empty());
    }

    #[test]
    fn acquire_staged_sees_index_changes_not_yet_committed() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        commit_all(&repo, "initial");
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        index.write().unwrap();

        let (diff, refs) = acquire_staged(dir.path()).unwrap();
        assert_eq!(diff.files.len(), 1);
        assert_eq!(diff.files[0].display_path(), "a.txt");
        assert!(refs.base.is_some());
        assert!(refs.head.is_none());
    }

    #[test]
    fn acquire_commit_with_no_parent_diffs_against_empty_tree() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        let oid = commit_all(&repo, "initial");

        let (diff, refs) = acquire_commit(dir.path(), &oid.to_string()).unwrap();
        assert_eq!(diff.files.len(), 1);
        assert_eq!(refs.base, None);
        assert_eq!(refs.head, Some(oid.to_string()));
    }

    #[test]
    fn acquire_commit_with_parent_diffs_against_it() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        commit_all(&repo, "initial");
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
        let second = commit_all(&repo, "second");

        let (diff, refs) = acquire_commit(dir.path(), &second.to_string()).unwrap();
        assert_eq!(diff.files.len(), 1);
        assert!(refs.base.is_some());
        assert_eq!(refs.head, Some(second.to_string()));
    }

    #[test]
    fn acquire_commit_on_detached_head_still_resolves() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        let first = commit_all(&repo, "initial");
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
        commit_all(&repo, "second");
        repo.set_head_detached(first).unwrap();

        let (diff, refs) = acquire_commit(dir.path(), "HEAD").unwrap();
        assert_eq!(diff.files.len(), 1);
        assert_eq!(refs.head, Some(first.to_string()));
    }

    #[test]
    fn acquire_range_diffs_two_commits() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        let first = commit_all(&repo, "initial");
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
        let second = commit_all(&repo, "second");

        let (diff, refs) = acquire_range(dir.path(), &first.to_string(), &second.to_string()).unwrap();
        assert_eq!(diff.files.len(), 1);
        assert_eq!(refs.base, Some(first.to_string()));
        assert_eq!(refs.head, Some(second.to_string()));
    }

    #[test]
    fn acquire_branch_compares_against_merge_base() {
        let (dir, repo) = init_repo();
        std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
        commit_all(&repo, "initial");
        repo.branch("feature", &repo.head().unwrap().peel_to_commit().unwrap(), false).unwrap();
        repo.set_head("refs/heads/feature").unwrap();
        std::fs::write(dir.path().join("a.txt"), "one\ntwo\n").unwrap();
        commit_all(&repo, "feature work");

        let (diff, refs) = acquire_branch(dir.path(), "main").unwrap();
        assert_eq!(diff.files.len(), 1);
        assert!(refs.base.is_some());
        assert!(refs.head.is_some());
    }

    #[test]
    fn acquire_files_reads_plain_paths_without_a_repo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standalone.txt");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let (diff, refs) = acquire_files(&[path]).unwrap();
        assert_eq!(diff.files.len(), 1);
        assert_eq!(diff.files[0].hunks[0].lines.len(), 2);
        assert!(refs.base.is_none());
        assert!(refs.head.is_none());
    }

    #[test]
    fn acquire_files_on_empty_file_has_no_hunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let (diff, _refs) = acquire_files(&[path]).unwrap();
        assert_eq!(diff.files.len(), 1);
        assert!(diff.files[0].hunks.is_empty());
    }
}
