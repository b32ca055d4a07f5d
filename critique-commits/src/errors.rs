use thiserror::Error;

pub type CommitStoreResult<T> = Result<T, CommitStoreError>;

#[derive(Debug, Error)]
pub enum CommitStoreError {
    #[error("commit archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("commit archive serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no archive found for commit {0}")]
    NotFound(String),
}
