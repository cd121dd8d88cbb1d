//! `Link: <...>; rel="next"` header parsing for GitHub's pagination.

/// Extract the `rel="next"` URL from a `Link` header value, if present.
#[must_use]
pub fn next_link(link_header: &str) -> Option<String> {
    for part in link_header.split(',') {
        let part = part.trim();
        let mut segments = part.split(';');
        let url_segment = segments.next()?.trim();
        let is_next = segments.any(|s| s.trim() == "rel=\"next\"");
        if is_next && url_segment.starts_with('<') && url_segment.ends_with('>') {
            return Some(url_segment[1..url_segment.len() - 1].to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_next_link_among_multiple_rels() {
        let header = r#"<https://api.github.com/repos/o/r/commits?page=2>; rel="next", <https://api.github.com/repos/o/r/commits?page=5>; rel="last""#;
        assert_eq!(
            next_link(header),
            Some("https://api.github.com/repos/o/r/commits?page=2".to_string())
        );
    }

    #[test]
    fn returns_none_when_no_next_rel_present() {
        let header = r#"<https://api.github.com/repos/o/r/commits?page=1>; rel="first""#;
        assert_eq!(next_link(header), None);
    }

    #[test]
    fn returns_none_for_empty_header() {
        assert_eq!(next_link(""), None);
    }
}
