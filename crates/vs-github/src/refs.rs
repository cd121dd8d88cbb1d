//! Cross-reference extraction from commit/PR messages (spec.md §4.3).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CLOSES_PATTERN: Regex =
        Regex::new(r"(?i)\b(fix|close|resolve)(e[sd])?\s+#(\d+)").expect("valid regex");
    static ref BARE_REF_PATTERN: Regex = Regex::new(r"#(\d+)").expect("valid regex");
}

/// The first issue/PR reference found in a commit message, per spec.md
/// §4.3's two patterns: `(fix|close|resolve)(e[sd])?\s+#\d+` takes priority
/// over a bare `#\d+`.
#[must_use]
pub fn extract_first_ref(message: &str) -> Option<String> {
    if let Some(caps) = CLOSES_PATTERN.captures(message) {
        return Some(caps.get(3)?.as_str().to_string());
    }
    BARE_REF_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_closing_keyword_reference() {
        assert_eq!(extract_first_ref("Fixes #12345"), Some("12345".to_string()));
        assert_eq!(
            extract_first_ref("this closes #42 for good"),
            Some("42".to_string())
        );
        assert_eq!(
            extract_first_ref("Resolved #7: heap overflow"),
            Some("7".to_string())
        );
    }

    #[test]
    fn falls_back_to_bare_reference() {
        assert_eq!(
            extract_first_ref("see also #99 for context"),
            Some("99".to_string())
        );
    }

    #[test]
    fn returns_none_when_no_reference_present() {
        assert_eq!(extract_first_ref("just a plain commit message"), None);
    }

    #[test]
    fn prefers_closing_keyword_over_earlier_bare_reference() {
        // Bare #1 appears first in the string but the closing-keyword match
        // on #2 is the one spec.md §4.3 wants used to build the related-URL
        // fields.
        assert_eq!(
            extract_first_ref("related to #1, and fixes #2"),
            Some("2".to_string())
        );
    }
}
