//! Severity normalization (spec.md §4.5): a case-and-alias map, never a
//! hard failure. An unmapped value is logged and written with the closest
//! match rather than dropping the row.

use vs_db::entities::Severity;

#[must_use]
pub fn normalize_severity(raw: &str) -> Severity {
    let normalized = raw.trim().to_lowercase();
    match normalized.as_str() {
        "low" | "minor" | "info" | "informational" => Severity::Low,
        "medium" | "moderate" | "mid" => Severity::Medium,
        "high" | "important" | "major" => Severity::High,
        "critical" | "severe" | "blocker" => Severity::Critical,
        other => {
            tracing::warn!(raw = other, "unrecognized severity, defaulting to medium");
            Severity::Medium
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_aliases() {
        assert_eq!(normalize_severity("Moderate"), Severity::Medium);
        assert_eq!(normalize_severity("SEVERE"), Severity::Critical);
        assert_eq!(normalize_severity("info"), Severity::Low);
    }

    #[test]
    fn falls_back_to_medium_for_unknown_values() {
        assert_eq!(normalize_severity("whoknows"), Severity::Medium);
    }
}
