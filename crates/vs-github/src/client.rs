//! GitHub REST v3 client (spec.md §4.3, §6).
//!
//! Async, shared connection pool (one `reqwest::Client` per `GitHubClient`,
//! safe for concurrent use - spec.md §5). Reads and respects
//! `X-RateLimit-Remaining`/`X-RateLimit-Reset`, retries 5xx/timeouts with
//! backoff, and auto-follows `Link: rel="next"` pagination up to a page cap.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use vs_core::retry::with_backoff;
use vs_core::{VsError, VsResult};

use crate::pagination::next_link;
use crate::types::{Commit, DiffEntryRaw, FileDiffStat, Issue, PullRequest, Tag};

const API_BASE: &str = "https://api.github.com";
const DEFAULT_PAGE_CAP: usize = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limit state as last observed from response headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimitState {
    pub remaining: Option<i64>,
    pub reset_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct GitHubClient {
    http: reqwest::Client,
    token: Option<String>,
    rate_limit: Arc<Mutex<RateLimitState>>,
}

impl GitHubClient {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("reqwest client builds with static config");
        Self {
            http,
            token,
            rate_limit: Arc::new(Mutex::new(RateLimitState::default())),
        }
    }

    /// Build a client from the `GITHUB_TOKEN` environment variable
    /// (spec.md §6).
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var("GITHUB_TOKEN").ok())
    }

    /// Last observed rate-limit state, for callers (the Collector) that
    /// want to throttle their own concurrency based on it.
    pub async fn rate_limit(&self) -> RateLimitState {
        *self.rate_limit.lock().await
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "vulnsentinel-collector");
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder
    }

    /// Apply rate-limit etiquette before issuing a request: sleep until
    /// reset if exhausted (spec.md §4.3 HTTP client contract).
    async fn wait_for_rate_limit(&self) {
        let state = *self.rate_limit.lock().await;
        if let Some(remaining) = state.remaining {
            if remaining <= 0 {
                if let Some(reset_at) = state.reset_at {
                    let now = chrono::Utc::now();
                    if reset_at > now {
                        let wait = (reset_at - now)
                            .to_std()
                            .unwrap_or(Duration::from_secs(1));
                        tracing::warn!(wait_secs = wait.as_secs(), "rate limit exhausted, sleeping until reset");
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }
    }

    async fn record_rate_limit(&self, response: &Response) {
        let remaining = response
            .headers()
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let reset_epoch = response
            .headers()
            .get("X-RateLimit-Reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());

        let mut state = self.rate_limit.lock().await;
        if let Some(remaining) = remaining {
            state.remaining = Some(remaining);
        }
        if let Some(epoch) = reset_epoch {
            state.reset_at = chrono::DateTime::from_timestamp(epoch, 0);
        }
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT
    }

    /// GET a single page, following redirects automatically via reqwest.
    /// Returns the deserialized body and the `next` page URL, if any.
    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> VsResult<(T, Option<String>)> {
        self.wait_for_rate_limit().await;

        let response = with_backoff(
            3,
            Duration::from_millis(500),
            |err: &VsError| matches!(err, VsError::Transient(_)),
            || async {
                let resp = self
                    .request(reqwest::Method::GET, url)
                    .send()
                    .await
                    .map_err(|e| VsError::Transient(e.to_string()))?;

                // 403 on rate-limit is the one 4xx that's retried, per
                // spec.md §4.3's HTTP client contract.
                if resp.status() == StatusCode::FORBIDDEN
                    && resp
                        .headers()
                        .get("X-RateLimit-Remaining")
                        .and_then(|v| v.to_str().ok())
                        == Some("0")
                {
                    return Err(VsError::Transient("rate limited (403)".to_string()));
                }

                if Self::is_retryable_status(resp.status()) {
                    return Err(VsError::Transient(format!(
                        "server error: {}",
                        resp.status()
                    )));
                }

                Ok(resp)
            },
        )
        .await?;

        self.record_rate_limit(&response).await;

        if !response.status().is_success() {
            return Err(VsError::Transient(format!(
                "github request failed: {} {}",
                response.status(),
                url
            )));
        }

        let next = response
            .headers()
            .get("Link")
            .and_then(|v| v.to_str().ok())
            .and_then(next_link);

        let body = response
            .json::<T>()
            .await
            .map_err(|e| VsError::ParseSchema(e.to_string()))?;

        Ok((body, next))
    }

    /// Follow `Link: rel="next"` pagination up to `page_cap` pages,
    /// accumulating all items. `T` must deserialize as a JSON array page.
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        initial_url: String,
        page_cap: usize,
    ) -> VsResult<Vec<T>>
    where
        Vec<T>: DeserializeOwned,
    {
        let mut all = Vec::new();
        let mut url = Some(initial_url);
        let mut pages = 0;

        while let Some(current_url) = url {
            if pages >= page_cap {
                break;
            }
            let (mut page, next): (Vec<T>, Option<String>) = self.get_page(&current_url).await?;
            all.append(&mut page);
            url = next;
            pages += 1;
        }

        Ok(all)
    }

    /// `GET /repos/{owner}/{repo}/commits?sha={branch}&since={since}`.
    pub async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        since: chrono::DateTime<chrono::Utc>,
        page_cap: usize,
    ) -> VsResult<Vec<Commit>> {
        let url = format!(
            "{API_BASE}/repos/{owner}/{repo}/commits?sha={branch}&since={since}&per_page=100",
            since = since.to_rfc3339()
        );
        self.get_paginated(url, page_cap.max(1)).await
    }

    /// `GET /pulls?state=closed&sort=updated&direction=desc`, filtered by
    /// the caller to merged-after-`since` (spec.md §4.3: the endpoint has no
    /// `since` param, so we walk until `updated_at < since`).
    pub async fn list_closed_pulls_since(
        &self,
        owner: &str,
        repo: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> VsResult<Vec<PullRequest>> {
        let mut all = Vec::new();
        let mut url = Some(format!(
            "{API_BASE}/repos/{owner}/{repo}/pulls?state=closed&sort=updated&direction=desc&per_page=100"
        ));
        let mut pages = 0;

        'outer: while let Some(current_url) = url {
            if pages >= DEFAULT_PAGE_CAP {
                break;
            }
            let (page, next): (Vec<PullRequest>, Option<String>) =
                self.get_page(&current_url).await?;

            for pr in page {
                if pr.updated_at < since {
                    break 'outer;
                }
                all.push(pr);
            }

            url = next;
            pages += 1;
        }

        Ok(all.into_iter().filter(|pr| pr.merged_at.is_some_and(|m| m > since)).collect())
    }

    /// `GET /tags`, walked newest-first until `known_latest` is seen.
    pub async fn list_tags_until(
        &self,
        owner: &str,
        repo: &str,
        known_latest: Option<&str>,
    ) -> VsResult<Vec<Tag>> {
        let mut all = Vec::new();
        let mut url = Some(format!("{API_BASE}/repos/{owner}/{repo}/tags?per_page=100"));
        let mut pages = 0;

        'outer: while let Some(current_url) = url {
            if pages >= DEFAULT_PAGE_CAP {
                break;
            }
            let (page, next): (Vec<Tag>, Option<String>) = self.get_page(&current_url).await?;

            for tag in page {
                if Some(tag.name.as_str()) == known_latest {
                    break 'outer;
                }
                all.push(tag);
            }

            url = next;
            pages += 1;
        }

        Ok(all)
    }

    /// `GET /issues?labels=bug&state=all&since={since}`, excluding rows that
    /// are actually PRs (spec.md §4.3).
    pub async fn list_bug_issues_since(
        &self,
        owner: &str,
        repo: &str,
        since: chrono::DateTime<chrono::Utc>,
    ) -> VsResult<Vec<Issue>> {
        let url = format!(
            "{API_BASE}/repos/{owner}/{repo}/issues?labels=bug&state=all&since={since}&sort=updated&direction=desc&per_page=100",
            since = since.to_rfc3339()
        );
        let all: Vec<Issue> = self.get_paginated(url, DEFAULT_PAGE_CAP).await?;
        Ok(all.into_iter().filter(|i| !i.is_actually_a_pr()).collect())
    }

    /// Diffstat-only view of a commit - no `patch` text, just file list and
    /// line counts (~200 tokens per spec.md §4.4).
    pub async fn commit_diffstat(&self, owner: &str, repo: &str, sha: &str) -> VsResult<Vec<FileDiffStat>> {
        let entries = self.raw_commit_diff(owner, repo, sha).await?;
        Ok(entries
            .into_iter()
            .map(|e| FileDiffStat {
                filename: e.filename,
                additions: e.additions,
                deletions: e.deletions,
                changes: e.changes,
                status: e.status,
            })
            .collect())
    }

    /// Full patch text for one file in a commit, truncated at
    /// `max_chars` with a marker (spec.md §4.4: 15,000 chars).
    pub async fn commit_file_patch(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        file_path: &str,
        max_chars: usize,
    ) -> VsResult<Option<String>> {
        let entries = self.raw_commit_diff(owner, repo, sha).await?;
        Ok(entries
            .into_iter()
            .find(|e| e.filename == file_path)
            .and_then(|e| e.patch)
            .map(|patch| truncate_patch(&patch, max_chars)))
    }

    async fn raw_commit_diff(&self, owner: &str, repo: &str, sha: &str) -> VsResult<Vec<DiffEntryRaw>> {
        #[derive(serde::Deserialize)]
        struct CommitWithFiles {
            #[serde(default)]
            files: Vec<DiffEntryRaw>,
        }
        let url = format!("{API_BASE}/repos/{owner}/{repo}/commits/{sha}");
        let (body, _): (CommitWithFiles, Option<String>) = self.get_page(&url).await?;
        Ok(body.files)
    }

    /// `fetch_pr_diff` tool: diffstat or single-file patch for a PR.
    pub async fn pr_diffstat(&self, owner: &str, repo: &str, pr_number: u64) -> VsResult<Vec<FileDiffStat>> {
        let entries = self.raw_pr_diff(owner, repo, pr_number).await?;
        Ok(entries
            .into_iter()
            .map(|e| FileDiffStat {
                filename: e.filename,
                additions: e.additions,
                deletions: e.deletions,
                changes: e.changes,
                status: e.status,
            })
            .collect())
    }

    pub async fn pr_file_patch(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        file_path: &str,
        max_chars: usize,
    ) -> VsResult<Option<String>> {
        let entries = self.raw_pr_diff(owner, repo, pr_number).await?;
        Ok(entries
            .into_iter()
            .find(|e| e.filename == file_path)
            .and_then(|e| e.patch)
            .map(|patch| truncate_patch(&patch, max_chars)))
    }

    async fn raw_pr_diff(&self, owner: &str, repo: &str, pr_number: u64) -> VsResult<Vec<DiffEntryRaw>> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}/pulls/{pr_number}/files?per_page=100");
        let (entries, _): (Vec<DiffEntryRaw>, Option<String>) = self.get_page(&url).await?;
        Ok(entries)
    }

    /// `fetch_file_content` tool.
    pub async fn file_content(&self, owner: &str, repo: &str, path: &str, git_ref: &str) -> VsResult<String> {
        #[derive(serde::Deserialize)]
        struct ContentResponse {
            content: String,
            encoding: String,
        }
        let url = format!("{API_BASE}/repos/{owner}/{repo}/contents/{path}?ref={git_ref}");
        let (body, _): (ContentResponse, Option<String>) = self.get_page(&url).await?;
        if body.encoding == "base64" {
            use base64::{engine::general_purpose::STANDARD, Engine as _};
            let cleaned: String = body.content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = STANDARD
                .decode(cleaned)
                .map_err(|e| VsError::ParseSchema(e.to_string()))?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        } else {
            Ok(body.content)
        }
    }

    /// `GET /repos/{owner}/{repo}/git/trees/{git_ref}?recursive=1`, returning
    /// the paths of every blob (file) in the tree. Used by the Dependency
    /// Scanner's manifest-discovery walk as the "repo file API" alternative
    /// to a shallow clone (spec.md §4.2 step 2).
    pub async fn list_tree_paths(&self, owner: &str, repo: &str, git_ref: &str) -> VsResult<Vec<String>> {
        #[derive(serde::Deserialize)]
        struct TreeEntry {
            path: String,
            #[serde(rename = "type")]
            kind: String,
        }
        #[derive(serde::Deserialize)]
        struct TreeResponse {
            #[serde(default)]
            tree: Vec<TreeEntry>,
            #[serde(default)]
            truncated: bool,
        }

        let url = format!("{API_BASE}/repos/{owner}/{repo}/git/trees/{git_ref}?recursive=1");
        let (body, _): (TreeResponse, Option<String>) = self.get_page(&url).await?;
        if body.truncated {
            tracing::warn!(owner, repo, git_ref, "tree listing truncated by GitHub, some manifests may be missed");
        }
        Ok(body
            .tree
            .into_iter()
            .filter(|e| e.kind == "blob")
            .map(|e| e.path)
            .collect())
    }

    /// `fetch_issue_body` tool.
    pub async fn issue_body(&self, owner: &str, repo: &str, issue_number: u64) -> VsResult<Option<String>> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}/issues/{issue_number}");
        let (issue, _): (Issue, Option<String>) = self.get_page(&url).await?;
        Ok(issue.body)
    }

    /// `fetch_pr_body` tool.
    pub async fn pr_body(&self, owner: &str, repo: &str, pr_number: u64) -> VsResult<Option<String>> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}/pulls/{pr_number}");
        let (pr, _): (PullRequest, Option<String>) = self.get_page(&url).await?;
        Ok(pr.body)
    }
}

fn truncate_patch(patch: &str, max_chars: usize) -> String {
    if patch.chars().count() <= max_chars {
        return patch.to_string();
    }
    let truncated: String = patch.chars().take(max_chars).collect();
    format!("{truncated}\n... [truncated, patch exceeds {max_chars} chars]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_patches_exceeding_the_limit() {
        let patch = "a".repeat(100);
        let truncated = truncate_patch(&patch, 10);
        assert!(truncated.starts_with(&"a".repeat(10)));
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn leaves_short_patches_untouched() {
        let patch = "short patch";
        assert_eq!(truncate_patch(patch, 1000), patch);
    }
}
