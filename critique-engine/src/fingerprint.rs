//! Per-file cache key: hash over (provider, model, normalized diff payload,
//! language, prompt template version).

use sha2::{Digest, Sha256};

/// Bumped whenever the review prompt's shape changes in a way that would
/// invalidate previously cached responses.
pub const PROMPT_TEMPLATE_VERSION: u32 = 1;

pub fn compute(provider_name: &str, model: &str, diff_payload: &str, language: &str) -> String {
    let normalized = diff_payload.trim();
    let mut hasher = Sha256::new();
    hasher.update(provider_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(model.as_bytes());
    hasher.update(b"\0");
    hasher.update(normalized.as_bytes());
    hasher.update(b"\0");
    hasher.update(language.as_bytes());
    hasher.update(b"\0");
    hasher.update(PROMPT_TEMPLATE_VERSION.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_produce_same_fingerprint() {
        let a = compute("ollama", "llama3", "+fn x() {}", "rust");
        let b = compute("ollama", "llama3", "+fn x() {}", "rust");
        assert_eq!(a, b);
    }

    #[test]
    fn differing_model_changes_fingerprint() {
        let a = compute("ollama", "llama3", "+fn x() {}", "rust");
        let b = compute("ollama", "mistral", "+fn x() {}", "rust");
        assert_ne!(a, b);
    }

    #[test]
    fn leading_trailing_whitespace_is_normalized() {
        let a = compute("ollama", "llama3", "+fn x() {}", "rust");
        let b = compute("ollama", "llama3", "  +fn x() {}  \n", "rust");
        assert_eq!(a, b);
    }
}
