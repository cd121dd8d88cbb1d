//! Minimal GitHub REST v3 response shapes - only the fields the Collector
//! and the agent tools actually read (spec.md §4.3, §4.4, §4.5).

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitParent {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub commit: CommitDetail,
    pub author: Option<Author>,
    pub html_url: String,
    #[serde(default)]
    pub parents: Vec<CommitParent>,
}

impl Commit {
    /// Excludes merge commits, per spec.md §4.3.
    #[must_use]
    pub fn is_merge_commit(&self) -> bool {
        self.parents.len() > 1
    }
}

/// `GET /pulls?state=closed`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: Option<Author>,
    pub html_url: String,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub merge_commit_sha: Option<String>,
}

/// `GET /tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
    pub commit: TagCommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagCommitRef {
    pub sha: String,
}

/// `GET /issues?labels=bug`.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub user: Option<Author>,
    pub html_url: String,
    pub updated_at: DateTime<Utc>,
    /// Present (non-null) when the API returned a PR masquerading as an
    /// issue - these must be excluded (spec.md §4.3).
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    #[must_use]
    pub fn is_actually_a_pr(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Diffstat-only summary for one file in a commit or PR diff - returned when
/// a tool call omits `file_path` (spec.md §4.1 "Diffstat-first").
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileDiffStat {
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiffEntryRaw {
    pub filename: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub status: String,
    pub patch: Option<String>,
}
