use thiserror::Error;

pub type MemoryResult<T> = Result<T, MemoryError>;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory store I/O error: {0}")]
    Db(#[from] tokio_rusqlite::Error),

    #[error("memory store I/O error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("memory store directory I/O error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("memory store serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("item {0} not found")]
    NotFound(String),
}
