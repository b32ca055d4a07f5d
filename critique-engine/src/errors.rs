//! Root error type for the review engine.
//!
//! Leaf crates' errors compose in via `#[error(transparent)] #[from]`,
//! mirroring `mr-reviewer::errors::Error`'s composition of its own leaves.
//! `Cancelled`/`DeadlineExceeded` live here directly since only the engine
//! owns the cancellation token.

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Diff(#[from] critique_diff::DiffError),

    #[error(transparent)]
    Rule(#[from] critique_rules::RuleError),

    #[error(transparent)]
    Cache(#[from] critique_cache::CacheError),

    #[error(transparent)]
    Provider(#[from] critique_providers::ProviderError),

    #[error("run cancelled before completion")]
    Cancelled,

    #[error("run exceeded its deadline")]
    DeadlineExceeded,

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
}

/// Per-file failures never abort the run; they're recorded here instead.
#[derive(Debug, Error, Clone)]
pub enum FileReviewError {
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("provider transport error: {0}")]
    ProviderTransport(String),

    #[error("provider rejected credentials")]
    ProviderAuth,

    #[error("provider rate limited the request")]
    ProviderRateLimited,

    #[error("provider response could not be parsed: {0}")]
    ProviderMalformedResponse(String),

    #[error("provider context window exceeded")]
    ProviderContextOverflow,

    #[error("cache I/O error: {0}")]
    CacheIo(String),

    #[error("history store I/O error: {0}")]
    HistoryIo(String),

    #[error("task cancelled")]
    Cancelled,
}

impl From<&critique_providers::ProviderError> for FileReviewError {
    fn from(err: &critique_providers::ProviderError) -> Self {
        use critique_providers::ProviderError as P;
        match err {
            P::Config(msg) => FileReviewError::ProviderUnavailable(msg.clone()),
            P::Auth => FileReviewError::ProviderAuth,
            P::RateLimited => FileReviewError::ProviderRateLimited,
            P::Unavailable(msg) => FileReviewError::ProviderUnavailable(msg.clone()),
            P::MalformedResponse(msg) => FileReviewError::ProviderMalformedResponse(msg.clone()),
            P::ContextOverflow => FileReviewError::ProviderContextOverflow,
            P::Timeout(secs) => FileReviewError::ProviderTransport(format!("timed out after {secs}s")),
            P::Transport(err) => FileReviewError::ProviderTransport(err.to_string()),
            P::Serde(err) => FileReviewError::ProviderMalformedResponse(err.to_string()),
        }
    }
}
