//! Per-commit archive store: `{repo}/.git-adjacent/{hash}/` directories,
//! each holding `analysis.md`, `issues.json`, `context.json`.
//!
//! Writes are transactional at the directory level, generalizing
//! `codegraph-prep::export::save_all::persist_all`'s "ensure dir, write
//! every artifact, never leave partial state visible" shape from a single
//! timestamped directory to a per-commit-hash tree: artifacts are written
//! into a sibling temp directory, then the temp directory is renamed into
//! place, so a reader never observes a partially-written archive.

use std::path::{Path, PathBuf};

use tokio::fs;
use walkdir::WalkDir;

use crate::errors::{CommitStoreError, CommitStoreResult};
use crate::model::{ArchiveSummary, CommitAnalysis, RecallQuery};

const ARCHIVE_DIR_NAME: &str = ".git-adjacent";

pub struct CommitStore {
    root: PathBuf,
}

impl CommitStore {
    pub fn new(repo_path: impl AsRef<Path>) -> Self {
        Self { root: repo_path.as_ref().join(ARCHIVE_DIR_NAME) }
    }

    fn commit_dir(&self, hash: &str) -> PathBuf {
        self.root.join(hash)
    }

    pub async fn store(&self, analysis: &CommitAnalysis) -> CommitStoreResult<()> {
        fs::create_dir_all(&self.root).await?;

        let tmp_dir = self.root.join(format!(".tmp-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&tmp_dir).await?;

        fs::write(tmp_dir.join("analysis.md"), analysis.to_markdown()).await?;
        fs::write(tmp_dir.join("issues.json"), serde_json::to_vec_pretty(analysis)?).await?;
        fs::write(tmp_dir.join("context.json"), serde_json::to_vec_pretty(&analysis.context)?).await?;

        let final_dir = self.commit_dir(&analysis.commit_hash);
        if final_dir.exists() {
            fs::remove_dir_all(&final_dir).await?;
        }
        fs::rename(&tmp_dir, &final_dir).await?;
        Ok(())
    }

    pub async fn load(&self, hash: &str) -> CommitStoreResult<CommitAnalysis> {
        let path = self.commit_dir(hash).join("issues.json");
        let data = fs::read(&path).await.map_err(|_| CommitStoreError::NotFound(hash.to_string()))?;
        let analysis: CommitAnalysis = serde_json::from_slice(&data)?;
        Ok(analysis)
    }

    pub async fn list(&self) -> CommitStoreResult<Vec<ArchiveSummary>> {
        let root = self.root.clone();
        let summaries = tokio::task::spawn_blocking(move || -> CommitStoreResult<Vec<ArchiveSummary>> {
            let mut out = Vec::new();
            if !root.exists() {
                return Ok(out);
            }
            for entry in WalkDir::new(&root).min_depth(1).max_depth(1).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_dir() {
                    continue;
                }
                let issues_path = entry.path().join("issues.json");
                if !issues_path.exists() {
                    continue;
                }
                let data = std::fs::read(&issues_path)?;
                let analysis: CommitAnalysis = serde_json::from_slice(&data)?;
                out.push(ArchiveSummary::from(&analysis));
            }
            Ok(out)
        })
        .await
        .expect("blocking walk task panicked")?;
        Ok(summaries)
    }

    pub async fn recall(&self, query: RecallQuery) -> CommitStoreResult<Vec<CommitAnalysis>> {
        let root = self.root.clone();
        let matches = tokio::task::spawn_blocking(move || -> CommitStoreResult<Vec<CommitAnalysis>> {
            let mut out = Vec::new();
            if !root.exists() {
                return Ok(out);
            }
            for entry in WalkDir::new(&root).min_depth(1).max_depth(1).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_dir() {
                    continue;
                }
                let issues_path = entry.path().join("issues.json");
                if !issues_path.exists() {
                    continue;
                }
                let data = std::fs::read(&issues_path)?;
                let analysis: CommitAnalysis = serde_json::from_slice(&data)?;
                if query.matches(&analysis) {
                    out.push(analysis);
                }
            }
            Ok(out)
        })
        .await
        .expect("blocking walk task panicked")?;
        Ok(matches)
    }
}
