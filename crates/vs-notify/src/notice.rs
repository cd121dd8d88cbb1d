//! The payload a `NotificationChannel` renders - everything a human needs to
//! act on a confirmed, reachable vulnerability in their project.

use chrono::{DateTime, Utc};
use serde::Serialize;
use vs_db::entities::Severity;

#[derive(Debug, Clone, Serialize)]
pub struct VulnNotice {
    pub client_vuln_id: String,
    pub project_name: String,
    pub project_contact: Option<String>,
    pub library_name: String,
    pub vuln_type: String,
    pub severity: Severity,
    pub summary: String,
    pub affected_versions: String,
    pub fix_version: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl VulnNotice {
    #[must_use]
    pub fn title(&self) -> String {
        format!("{:?} severity {} in {}", self.severity, self.vuln_type, self.library_name)
    }
}
