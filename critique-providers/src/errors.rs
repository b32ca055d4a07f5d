//! Provider error hierarchy.
//!
//! HTTP status codes are mapped once, at the transport boundary, into a
//! small set of kinds the engine can act on (retry, fail the file, fail
//! the run) without knowing which backend answered.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider config invalid: {0}")]
    Config(String),

    #[error("authentication rejected by provider")]
    Auth,

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider response could not be parsed: {0}")]
    MalformedResponse(String),

    #[error("provider context window exceeded")]
    ContextOverflow,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ProviderError {
    /// Transient errors are worth retrying with backoff; the rest are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited | ProviderError::Unavailable(_) | ProviderError::Timeout(_))
    }

    /// Maps a `reqwest` failure at the transport boundary. Timeouts get their
    /// own kind so the engine can distinguish "provider took too long" from
    /// "provider connection refused/reset" without inspecting `reqwest::Error`.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else {
            ProviderError::Transport(err)
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            400 if looks_like_context_overflow(body) => ProviderError::ContextOverflow,
            401 | 403 => ProviderError::Auth,
            404 => ProviderError::Unavailable(format!("not found: {body}")),
            429 => ProviderError::RateLimited,
            500..=599 => ProviderError::Unavailable(format!("server error {status}: {body}")),
            _ => ProviderError::MalformedResponse(format!("unexpected status {status}: {body}")),
        }
    }
}

/// Context-length errors aren't a distinct HTTP status; providers report
/// them as a 400 with a message body. Checks the markers used by OpenAI's
/// `context_length_exceeded` code, Gemini's token-limit wording, and the
/// generic phrasing other OpenAI-compatible backends (Groq, etc.) echo back.
fn looks_like_context_overflow(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("context_length_exceeded")
        || lower.contains("maximum context length")
        || lower.contains("context length")
        || lower.contains("exceeds the maximum number of tokens")
        || lower.contains("token limit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_detects_context_overflow_on_400() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        let err = ProviderError::from_status(status, "This model's maximum context length is 8192 tokens");
        assert!(matches!(err, ProviderError::ContextOverflow));
    }

    #[test]
    fn from_status_keeps_plain_400_as_malformed() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        let err = ProviderError::from_status(status, "invalid request: missing field");
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }
}
