//! Entity structs and enum types, per spec.md §3 and §6.
//!
//! Every table carries `id`, `created_at`, `updated_at` (maintained by
//! application-level `touch()` rather than a DB trigger, since this crate
//! specifies the schema as a contract - see `schema.sql` - without owning a
//! migration runner).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use vs_core::ids::{
    AgentRunId, ClientVulnId, EventId, LibraryId, ProjectId, SnapshotId, UpstreamVulnId, UserId,
};

/// The only platform the core supports initially (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "platform", rename_all = "lowercase")]
pub enum Platform {
    Github,
}

/// Sentinel string marking a `ProjectDependency` row as user-owned. Stored in
/// the free-text `constraint_source` column rather than a dedicated boolean
/// so manifest file paths can share the column (spec.md §3).
pub const CONSTRAINT_SOURCE_MANUAL: &str = "manual";

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
pub enum EventType {
    Commit,
    PrMerge,
    Tag,
    BugIssue,
}

/// Fixed five-value classification enum (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "event_classification", rename_all = "snake_case")]
pub enum EventClassification {
    SecurityBugfix,
    NormalBugfix,
    Refactor,
    Feature,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "severity_level", rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "upstream_vuln_status", rename_all = "snake_case")]
pub enum UpstreamVulnStatus {
    Analyzing,
    Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "pipeline_status", rename_all = "snake_case")]
pub enum PipelineStatus {
    Pending,
    PathSearching,
    PocGenerating,
    Verified,
    NotAffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "client_vuln_status", rename_all = "snake_case")]
pub enum ClientVulnStatus {
    Recorded,
    Reported,
    Confirmed,
    Fixed,
    NotAffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "agent_run_status", rename_all = "snake_case")]
pub enum AgentRunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
    pub repo_url: String,
    pub platform: Platform,
    pub default_branch: String,
    pub latest_commit_sha: Option<String>,
    pub latest_tag_version: Option<String>,
    pub last_activity_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub repo_url: String,
    pub platform: Platform,
    pub default_branch: String,
    pub contact: Option<String>,
    pub current_version: Option<String>,
    pub pinned_ref: Option<String>,
    pub auto_sync_deps: bool,
    pub monitoring_since: DateTime<Utc>,
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// The ref the scanner should clone/fetch: the pin if set, else the
    /// default branch (spec.md §4.2 step 1).
    #[must_use]
    pub fn scan_ref(&self) -> &str {
        self.pinned_ref.as_deref().unwrap_or(&self.default_branch)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProjectDependency {
    pub id: uuid::Uuid,
    pub project_id: ProjectId,
    pub library_id: LibraryId,
    pub constraint_expr: Option<String>,
    pub resolved_version: Option<String>,
    pub constraint_source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectDependency {
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.constraint_source == CONSTRAINT_SOURCE_MANUAL
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub library_id: LibraryId,
    #[sqlx(rename = "event_type")]
    pub r#type: EventType,
    pub r#ref: String,
    pub source_url: String,
    pub author: Option<String>,
    pub title: String,
    pub message: Option<String>,
    pub related_issue_ref: Option<String>,
    pub related_pr_ref: Option<String>,
    pub related_commit_sha: Option<String>,
    pub related_url: Option<String>,
    pub event_at: DateTime<Utc>,
    pub classification: Option<EventClassification>,
    pub confidence: Option<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Derived field per spec.md §3: `is_bugfix == (classification ==
    /// security_bugfix)`.
    #[must_use]
    pub fn is_bugfix(&self) -> bool {
        self.classification == Some(EventClassification::SecurityBugfix)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct UpstreamVuln {
    pub id: UpstreamVulnId,
    pub event_id: EventId,
    pub library_id: LibraryId,
    pub commit_sha: String,
    pub vuln_type: String,
    pub severity: Severity,
    pub affected_versions: String,
    pub summary: String,
    pub reasoning: String,
    pub upstream_poc: Option<Json>,
    pub affected_functions: Option<Vec<String>>,
    pub status: UpstreamVulnStatus,
    pub error_message: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ClientVuln {
    pub id: ClientVulnId,
    pub upstream_vuln_id: UpstreamVulnId,
    pub project_id: ProjectId,
    pub constraint_expr: Option<String>,
    pub resolved_version: Option<String>,
    pub constraint_source: Option<String>,
    pub fix_version: Option<String>,
    pub verdict: Option<String>,
    pub pipeline_status: PipelineStatus,
    pub status: Option<ClientVulnStatus>,
    pub is_affected: Option<bool>,
    pub error_message: Option<String>,
    pub reachable_path: Option<Json>,
    pub poc_results: Option<Json>,
    pub report: Option<Json>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub not_affect_at: Option<DateTime<Utc>>,
    pub reported_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub fixed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientVuln {
    /// Allowed transitions per spec.md §8 invariant 5:
    /// `null -> recorded | not_affect`; `recorded -> reported -> confirmed
    /// -> fixed`; `fixed` and `not_affect` are terminal.
    #[must_use]
    pub fn can_transition_to(&self, next: ClientVulnStatus) -> bool {
        matches!(
            (self.status, next),
            (None, ClientVulnStatus::Recorded)
                | (None, ClientVulnStatus::NotAffect)
                | (Some(ClientVulnStatus::Recorded), ClientVulnStatus::Reported)
                | (Some(ClientVulnStatus::Reported), ClientVulnStatus::Confirmed)
                | (Some(ClientVulnStatus::Confirmed), ClientVulnStatus::Fixed)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            Some(ClientVulnStatus::Fixed) | Some(ClientVulnStatus::NotAffect)
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub repo_url: String,
    pub version: String,
    pub backend: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: AgentRunId,
    pub agent_type: String,
    pub engine: String,
    pub target_type: String,
    pub target_id: uuid::Uuid,
    pub model: String,
    pub turn_count: i32,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub estimated_cost_usd: f64,
    pub duration_ms: i64,
    pub status: AgentRunStatus,
    pub result: Option<Json>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AgentToolCall {
    pub id: uuid::Uuid,
    pub run_id: AgentRunId,
    pub turn_index: i32,
    pub sequence: i32,
    pub tool_name: String,
    pub input: Json,
    pub output_size: i64,
    pub duration_ms: i64,
    pub is_error: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
