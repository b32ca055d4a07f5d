use thiserror::Error;

pub type DiffResult<T> = Result<T, DiffError>;

/// Root error type for diff acquisition and parsing.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unified-diff parser errors. Only unrecoverable syntactic problems land
/// here; unknown header lines are tolerated and skipped.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid hunk header: {0}")]
    InvalidHunkHeader(String),

    #[error("malformed diff: {0}")]
    MalformedDiff(String),
}
