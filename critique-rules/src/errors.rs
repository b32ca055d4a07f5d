use thiserror::Error;

pub type RuleResult<T> = Result<T, RuleError>;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid rule {id}: {reason}")]
    InvalidRule { id: String, reason: String },

    #[error("duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yml::Error),
}
