//! Best-effort JSON extraction from an LLM's final text content (spec.md
//! §4.4, §4.5). Models routinely wrap their answer in prose or a markdown
//! fence; this pulls out the first balanced `{...}` or `[...]` rather than
//! requiring the whole response to be valid JSON.

use serde_json::Value;
use vs_core::{VsError, VsResult};

/// Find the first balanced top-level JSON value (object or array) in
/// `content` and parse it. Returns an error if none is found or it fails to
/// parse.
pub fn extract_json_value(content: &str) -> VsResult<Value> {
    let raw = find_balanced_json(content)
        .ok_or_else(|| VsError::ParseSchema("no JSON object or array found in response".to_string()))?;
    serde_json::from_str(raw).map_err(|e| VsError::ParseSchema(format!("invalid JSON in response: {e}")))
}

/// Like [`extract_json_value`], but normalizes a bare object into a
/// single-element array (spec.md §4.5: "the JSON extractor accepts a bare
/// object and wraps it").
pub fn extract_json_array(content: &str) -> VsResult<Vec<Value>> {
    match extract_json_value(content)? {
        Value::Array(items) => Ok(items),
        other @ Value::Object(_) => Ok(vec![other]),
        other => Err(VsError::ParseSchema(format!("expected a JSON object or array, got {other}"))),
    }
}

fn find_balanced_json(content: &str) -> Option<&str> {
    let bytes = content.as_bytes();
    let start = bytes.iter().position(|b| *b == b'{' || *b == b'[')?;
    let open = bytes[start];
    let close = if open == b'{' { b'}' } else { b']' };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return content.get(start..start + offset + 1);
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
    fn extracts_object_wrapped_in_prose() {
        let content = "Here is my answer:\n```json\n{\"label\": \"security_bugfix\", \"confidence\": 0.9}\n```\nDone.";
        let value = extract_json_value(content).unwrap();
        assert_eq!(value["label"], "security_bugfix");
    }

    #[test]
    fn wraps_bare_object_into_single_element_array() {
        let content = r#"{"vuln_type": "buffer overflow"}"#;
        let items = extract_json_array(content).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["vuln_type"], "buffer overflow");
    }

    #[test]
    fn extracts_array_directly() {
        let content = r#"prefix [{"a": 1}, {"a": 2}] suffix"#;
        let items = extract_json_array(content).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn ignores_braces_inside_string_values() {
        let content = r#"{"summary": "uses a { in text", "ok": true}"#;
        let value = extract_json_value(content).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn errors_when_no_json_present() {
        assert!(extract_json_value("no json here").is_err());
    }
}
