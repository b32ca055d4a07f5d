//! Extracts the first balanced `{...}` span from provider output.
//!
//! Provider output is untrusted text that may wrap a JSON object in prose
//! or a markdown fence; the review prompt contract asks for a single JSON
//! object, so we scan for the first top-level brace span and leave
//! deserialization failure of that span to the caller.

/// Returns the first balanced-brace substring of `text`, if any. Braces
/// inside string literals are not treated as structural (a naive depth
/// counter would otherwise misparse a message containing `"a { b"`).
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_surrounding_prose() {
        let text = "Sure, here's the review:\n```json\n{\"issues\":[],\"summary\":\"ok\",\"score\":95}\n```\nLet me know if you need more.";
        let extracted = extract_json_object(text).unwrap();
        assert_eq!(extracted, r#"{"issues":[],"summary":"ok","score":95}"#);
    }

    #[test]
    fn tolerates_braces_inside_string_values() {
        let text = r#"{"summary":"looks like a { b } c","score":50,"issues":[]}"#;
        let extracted = extract_json_object(text).unwrap();
        assert_eq!(extracted, text);
    }

    #[test]
    fn returns_none_without_braces() {
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn stops_at_first_balanced_span_with_trailing_garbage() {
        let text = r#"{"a":1} trailing noise {"b":2}"#;
        assert_eq!(extract_json_object(text).unwrap(), r#"{"a":1}"#);
    }
}
