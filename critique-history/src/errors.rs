use thiserror::Error;

pub type HistoryResult<T> = Result<T, HistoryError>;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history store I/O error: {0}")]
    Io(#[from] tokio_rusqlite::Error),

    #[error("history store I/O error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("history record {0} not found")]
    NotFound(i64),
}
