//! Builds the review prompt per the §4.4 contract: ask for a single JSON
//! object with `issues`/`summary`/`score`, tolerating surrounding prose on
//! the way back out (see `json_extract`).

use crate::model::ReviewRequest;

pub fn build_review_prompt(request: &ReviewRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are a senior code reviewer. Review the following diff and respond with a single JSON object \
         with fields \"issues\" (array), \"summary\" (string), \"score\" (integer 0-100). \
         Do not include any text outside the JSON object.\n\n",
    );
    prompt.push_str(&format!("Language: {}\n", request.language));
    prompt.push_str(&format!("File: {}\n\n", request.file_path));
    if let Some(context) = &request.context {
        if !context.is_empty() {
            prompt.push_str("Context (rule-based findings and surrounding code, for reference only):\n");
            prompt.push_str(context);
            prompt.push_str("\n\n");
        }
    }
    prompt.push_str("Diff:\n");
    prompt.push_str(&request.diff_payload);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_language_file_and_diff() {
        let request = ReviewRequest {
            file_path: "src/main.rs".into(),
            language: "rust".into(),
            diff_payload: "+fn x() {}".into(),
            context: None,
            fingerprint: "abc".into(),
        };
        let prompt = build_review_prompt(&request);
        assert!(prompt.contains("rust"));
        assert!(prompt.contains("src/main.rs"));
        assert!(prompt.contains("+fn x() {}"));
        assert!(!prompt.contains("Context"));
    }

    #[test]
    fn prompt_includes_context_when_present() {
        let request = ReviewRequest {
            file_path: "src/main.rs".into(),
            language: "rust".into(),
            diff_payload: "+fn x() {}".into(),
            context: Some("[Warning] naming: bad name".into()),
            fingerprint: "abc".into(),
        };
        let prompt = build_review_prompt(&request);
        assert!(prompt.contains("Context"));
        assert!(prompt.contains("bad name"));
    }
}
