//! Rule-engine pre-filter (spec.md §4.4), applied before any LLM call. Rule
//! order is load-bearing: the security-keyword check runs before both the
//! bot-author rule and the conventional-commit mapping, or a message like
//! "fix: heap buffer overflow" (or a bot-authored commit bumping a
//! dependency "to fix heap overflow") gets classified as `other`/
//! `normal_bugfix` by rule instead of being handed to the LLM.

use regex::Regex;

use vs_db::entities::{Event, EventClassification, EventType};

const BOT_AUTHORS: &[&str] = &[
    "dependabot[bot]",
    "dependabot-preview[bot]",
    "renovate[bot]",
    "snyk-bot",
    "greenkeeper[bot]",
    "github-actions[bot]",
    "allcontributors[bot]",
];

const SECURITY_KEYWORDS: &[&str] = &[
    r"\bCVE-\d{4}-\d+\b",
    r"\bCWE-\d+\b",
    r"\bvulnerabilit\w*\b",
    r"\bexploit\w*\b",
    r"\bsecurity\b",
    r"\bbuffer overflow\b",
    r"\bheap overflow\b",
    r"\bstack overflow\b",
    r"\buse.after.free\b",
    r"\bdouble free\b",
    r"\bout.of.bounds\b",
    r"\binteger (overflow|underflow)\b",
    r"\bnull pointer dereference\b",
    r"\buninitiali[sz]ed memory\b",
    r"\brace condition\b",
    r"\bTOCTOU\b",
    r"\binjection\b",
    r"\bXSS\b",
    r"\bCSRF\b",
    r"\bSSRF\b",
    r"\bauth(entication)? bypass\b",
    r"\bprivilege escalation\b",
    r"\binformation leak\w*\b",
    r"\bDoS\b",
    r"\bdenial.of.service\b",
    r"\bmemory corruption\b",
    r"\bmemory safety\b",
];

/// One conventional-commit prefix and the class/confidence it maps to.
const CONVENTIONAL_PREFIXES: &[(&str, EventClassification, f32)] = &[
    ("fix:", EventClassification::NormalBugfix, 0.75),
    ("fix(", EventClassification::NormalBugfix, 0.75),
    ("feat:", EventClassification::Feature, 0.85),
    ("feat(", EventClassification::Feature, 0.85),
    ("refactor:", EventClassification::Refactor, 0.85),
    ("refactor(", EventClassification::Refactor, 0.85),
    ("perf:", EventClassification::Refactor, 0.70),
    ("perf(", EventClassification::Refactor, 0.70),
    ("docs:", EventClassification::Other, 0.80),
    ("docs(", EventClassification::Other, 0.80),
    ("test:", EventClassification::Other, 0.75),
    ("test(", EventClassification::Other, 0.75),
    ("style:", EventClassification::Other, 0.75),
    ("style(", EventClassification::Other, 0.75),
    ("chore:", EventClassification::Other, 0.70),
    ("chore(", EventClassification::Other, 0.70),
    ("build:", EventClassification::Other, 0.75),
    ("build(", EventClassification::Other, 0.75),
    ("ci:", EventClassification::Other, 0.75),
    ("ci(", EventClassification::Other, 0.75),
];

fn security_keyword_regex() -> Regex {
    Regex::new(&format!("(?i)({})", SECURITY_KEYWORDS.join("|"))).expect("valid regex")
}

/// Rule-engine verdict. `None` means "hand this event to the LLM" - either
/// because a security keyword was seen or no rule matched at all.
///
/// The keyword check runs before the bot-author check: a bot-authored
/// commit whose title mentions a security keyword must still reach the
/// LLM rather than being short-circuited to `other` (spec.md §8 boundary
/// behavior - `author='dependabot', title='...heap overflow'` goes to the
/// LLM, not `other`).
#[must_use]
pub fn classify(event: &Event) -> Option<(EventClassification, f32)> {
    if event.r#type == EventType::Tag {
        return Some((EventClassification::Other, 0.95));
    }

    let haystack = format!("{} {}", event.title, event.message.as_deref().unwrap_or_default());
    if security_keyword_regex().is_match(&haystack) {
        return None;
    }

    if event.author.as_deref().is_some_and(|author| BOT_AUTHORS.contains(&author)) {
        return Some((EventClassification::Other, 0.90));
    }

    let title = event.title.trim();
    CONVENTIONAL_PREFIXES
        .iter()
        .find(|(prefix, _, _)| title.starts_with(prefix))
        .map(|(_, classification, confidence)| (*classification, *confidence))
}

/// The pre-filter never returns `security_bugfix` - only the LLM can assign
/// that label (spec.md §4.4).
#[must_use]
pub fn never_returns_security_bugfix() -> bool {
    !CONVENTIONAL_PREFIXES
        .iter()
        .any(|(_, classification, _)| *classification == EventClassification::SecurityBugfix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vs_core::ids::{EventId, LibraryId};

    fn event(r#type: EventType, author: Option<&str>, title: &str, message: Option<&str>) -> Event {
        Event {
            id: EventId::new(),
            library_id: LibraryId::new(),
            r#type,
            r#ref: "abc123".to_string(),
            source_url: "https://github.com/acme/widget/commit/abc123".to_string(),
            author: author.map(str::to_string),
            title: title.to_string(),
            message: message.map(str::to_string),
            related_issue_ref: None,
            related_pr_ref: None,
            related_commit_sha: None,
            related_url: None,
            event_at: Utc::now(),
            classification: None,
            confidence: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn tags_are_always_other_at_high_confidence() {
        let e = event(EventType::Tag, None, "v1.2.3", None);
        assert_eq!(classify(&e), Some((EventClassification::Other, 0.95)));
    }

    #[test]
    fn bot_authored_commits_are_other() {
        let e = event(EventType::Commit, Some("dependabot[bot]"), "chore: bump lodash", None);
        assert_eq!(classify(&e), Some((EventClassification::Other, 0.90)));
    }

    #[test]
    fn security_keyword_overrides_conventional_prefix_match() {
        // "fix:" would otherwise map to normal_bugfix - the keyword check
        // must win so this goes to the LLM instead.
        let e = event(EventType::Commit, Some("alice"), "fix: heap buffer overflow in parser", None);
        assert_eq!(classify(&e), None);
    }

    #[test]
    fn security_keyword_in_message_body_is_also_caught() {
        let e = event(
            EventType::Commit,
            Some("alice"),
            "fix: tighten bounds check",
            Some("Addresses a potential use-after-free when the parser is re-entered."),
        );
        assert_eq!(classify(&e), None);
    }

    #[test]
    fn bot_authored_commit_with_security_keyword_goes_to_llm() {
        // spec.md §8 boundary behavior: the keyword rule wins over the bot
        // rule, so this must not be short-circuited to `other`.
        let e = event(EventType::Commit, Some("dependabot[bot]"), "bump dep to fix heap overflow", None);
        assert_eq!(classify(&e), None);
    }

    #[test]
    fn conventional_prefix_maps_to_expected_class() {
        let e = event(EventType::Commit, Some("bob"), "feat: add webhook retries", None);
        assert_eq!(classify(&e), Some((EventClassification::Feature, 0.85)));
    }

    #[test]
    fn unrecognized_message_falls_through_to_llm() {
        let e = event(EventType::Commit, Some("bob"), "bump version to 2.0", None);
        assert_eq!(classify(&e), None);
    }

    #[test]
    fn prefilter_never_assigns_security_bugfix() {
        assert!(never_returns_security_bugfix());
    }
}
