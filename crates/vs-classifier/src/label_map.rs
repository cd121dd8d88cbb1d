//! Reduces whatever label text the LLM emits down to the five
//! `event_classification` enum values (spec.md §4.4 "Output mapping").

use vs_db::entities::EventClassification;

/// Case-insensitive map from an extended/free-text label to the fixed
/// five-value enum. Falls back to `other` for anything unrecognized rather
/// than failing the run - the model's reasoning is still useful even when
/// its label vocabulary drifts.
#[must_use]
pub fn normalize_label(label: &str) -> EventClassification {
    let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
    match normalized.as_str() {
        "security_bugfix" | "security_fix" | "vulnerability_fix" | "cve_fix" => {
            EventClassification::SecurityBugfix
        }
        "normal_bugfix" | "bugfix" | "bug_fix" | "fix" => EventClassification::NormalBugfix,
        "refactor" | "refactoring" | "cleanup" | "performance" | "perf" => EventClassification::Refactor,
        "feature" | "feat" | "enhancement" => EventClassification::Feature,
        "documentation" | "docs" | "test" | "tests" | "chore" | "ci" | "build" | "style" | "other" => {
            EventClassification::Other
        }
        _ => EventClassification::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_extended_labels() {
        assert_eq!(normalize_label("bugfix"), EventClassification::NormalBugfix);
        assert_eq!(normalize_label("Documentation"), EventClassification::Other);
        assert_eq!(normalize_label("Security-Bugfix"), EventClassification::SecurityBugfix);
    }

    #[test]
    fn falls_back_to_other_for_unknown_labels() {
        assert_eq!(normalize_label("who knows"), EventClassification::Other);
    }
}
