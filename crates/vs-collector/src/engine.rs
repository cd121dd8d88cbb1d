//! `CollectorEngine` - the Event Collector pipeline (spec.md §4.3).
//!
//! Per-library concurrency bound via a `tokio::sync::Semaphore`, grounded on
//! the same pattern the `dashflow-evals` example repo uses for bounded
//! parallel scenario execution. Each library's four fetches (commits, PR
//! merges, tags, bug issues) run concurrently unless the GitHub client's
//! last-observed rate limit is running low, in which case they're walked
//! sequentially (spec.md §4.3 "HTTP client contract": remaining <= 100 ->
//! reduce parallelism to one).

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use vs_core::ids::LibraryId;
use vs_core::repo_ref::owner_repo;
use vs_core::VsResult;
use vs_db::dao::{EventDao, LibraryDao};
use vs_db::dao::event::NewEvent;
use vs_db::entities::{EventType, Library};
use vs_github::refs::extract_first_ref;
use vs_github::GitHubClient;

const FIRST_RUN_WINDOW_DAYS: i64 = 30;
const LOW_RATE_LIMIT_THRESHOLD: i64 = 100;

#[derive(Debug, Default)]
pub struct LibraryCollectReport {
    pub library_id: Option<LibraryId>,
    pub inserted_count: usize,
}

pub struct CollectorEngine<'a> {
    pool: &'a PgPool,
    github: Arc<GitHubClient>,
    concurrency: usize,
}

impl<'a> CollectorEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool, github: Arc<GitHubClient>, concurrency: usize) -> Self {
        Self { pool, github, concurrency: concurrency.max(1) }
    }

    /// Collect every library due for a pass (spec.md §4.3: `last_activity_at`
    /// older than `window`, default 75 minutes), bounded by a semaphore.
    pub async fn collect_due_libraries(&self, window: Duration) -> VsResult<Vec<LibraryCollectReport>> {
        let library_dao = LibraryDao::new(self.pool);
        let due = library_dao.list_due_for_collection(window).await?;

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(due.len());

        for library in due {
            let semaphore = semaphore.clone();
            let pool = self.pool;
            let github = self.github.clone();
            tasks.push(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                let report = CollectorEngine { pool, github, concurrency: 1 }.collect_library(&library).await;
                match report {
                    Ok(report) => Some(report),
                    Err(err) => {
                        tracing::error!(library_id = %library.id, error = %err, "event collection failed for library");
                        None
                    }
                }
            });
        }

        Ok(futures::future::join_all(tasks).await.into_iter().flatten().collect())
    }

    /// Run the four fetches for one library and reconcile into `events` +
    /// library pointers (spec.md §4.3 steps).
    pub async fn collect_library(&self, library: &Library) -> VsResult<LibraryCollectReport> {
        let (owner, repo) = owner_repo(&library.repo_url)?;
        let since = library
            .last_activity_at
            .unwrap_or_else(|| Utc::now() - Duration::days(FIRST_RUN_WINDOW_DAYS));

        let low_on_budget = self
            .github
            .rate_limit()
            .await
            .remaining
            .is_some_and(|remaining| remaining <= LOW_RATE_LIMIT_THRESHOLD);

        let (commits, prs, tags, issues) = if low_on_budget {
            let commits = self.github.list_commits(&owner, &repo, &library.default_branch, since, 1).await?;
            let prs = self.github.list_closed_pulls_since(&owner, &repo, since).await?;
            let tags = self.github.list_tags_until(&owner, &repo, library.latest_tag_version.as_deref()).await?;
            let issues = self.github.list_bug_issues_since(&owner, &repo, since).await?;
            (commits, prs, tags, issues)
        } else {
            tokio::try_join!(
                self.github.list_commits(&owner, &repo, &library.default_branch, since, 1),
                self.github.list_closed_pulls_since(&owner, &repo, since),
                self.github.list_tags_until(&owner, &repo, library.latest_tag_version.as_deref()),
                self.github.list_bug_issues_since(&owner, &repo, since),
            )?
        };

        let newest_commit_sha = commits.first().map(|c| c.sha.clone());
        let newest_tag = tags.first().map(|t| t.name.clone());

        let mut new_events = Vec::new();
        new_events.extend(commits_to_events(library.id, &owner, &repo, commits));
        new_events.extend(pr_merges_to_events(library.id, prs));
        new_events.extend(tags_to_events(library.id, &owner, &repo, tags));
        new_events.extend(bug_issues_to_events(library.id, issues));

        let event_dao = EventDao::new(self.pool);
        let inserted = event_dao.insert_batch(&new_events).await?;

        let library_dao = LibraryDao::new(self.pool);
        library_dao
            .advance_pointers(library.id, newest_commit_sha.as_deref(), newest_tag.as_deref(), true)
            .await?;

        Ok(LibraryCollectReport { library_id: Some(library.id), inserted_count: inserted.len() })
    }
}

fn related_url(owner: &str, repo: &str, message: &str) -> (Option<String>, Option<String>) {
    extract_first_ref(message).map_or((None, None), |reference| {
        (Some(reference.clone()), Some(format!("https://github.com/{owner}/{repo}/issues/{reference}")))
    })
}

fn commits_to_events(
    library_id: LibraryId,
    owner: &str,
    repo: &str,
    commits: Vec<vs_github::types::Commit>,
) -> Vec<NewEvent> {
    commits
        .into_iter()
        .filter(|c| !c.is_merge_commit())
        .map(|c| {
            let message = c.commit.message.clone();
            let title = message.lines().next().unwrap_or_default().to_string();
            let (related_issue_ref, related_url) = related_url(owner, repo, &message);
            NewEvent {
                library_id,
                r#type: EventType::Commit,
                r#ref: c.sha,
                source_url: c.html_url,
                author: c.author.and_then(|a| a.login),
                title,
                message: Some(message),
                related_issue_ref,
                related_pr_ref: None,
                related_commit_sha: None,
                related_url,
                event_at: c.commit.author.and_then(|a| a.date).unwrap_or_else(Utc::now),
            }
        })
        .collect()
}

fn pr_merges_to_events(library_id: LibraryId, prs: Vec<vs_github::types::PullRequest>) -> Vec<NewEvent> {
    prs.into_iter()
        .filter_map(|pr| {
            let merged_at = pr.merged_at?;
            Some(NewEvent {
                library_id,
                r#type: EventType::PrMerge,
                r#ref: pr.number.to_string(),
                source_url: pr.html_url,
                author: pr.user.and_then(|u| u.login),
                title: pr.title,
                message: pr.body,
                related_issue_ref: None,
                related_pr_ref: Some(pr.number.to_string()),
                related_commit_sha: pr.merge_commit_sha,
                related_url: None,
                event_at: merged_at,
            })
        })
        .collect()
}

fn tags_to_events(library_id: LibraryId, owner: &str, repo: &str, tags: Vec<vs_github::types::Tag>) -> Vec<NewEvent> {
    // The `/tags` endpoint carries no timestamp; `event_at` is set to the
    // collection time rather than the (unknown) tag creation time.
    tags.into_iter()
        .map(|tag| NewEvent {
            library_id,
            r#type: EventType::Tag,
            r#ref: tag.name.clone(),
            source_url: format!("https://github.com/{owner}/{repo}/releases/tag/{}", tag.name),
            author: None,
            title: tag.name,
            message: None,
            related_issue_ref: None,
            related_pr_ref: None,
            related_commit_sha: Some(tag.commit.sha),
            related_url: None,
            event_at: Utc::now(),
        })
        .collect()
}

fn bug_issues_to_events(library_id: LibraryId, issues: Vec<vs_github::types::Issue>) -> Vec<NewEvent> {
    issues
        .into_iter()
        .map(|issue| NewEvent {
            library_id,
            r#type: EventType::BugIssue,
            r#ref: issue.number.to_string(),
            source_url: issue.html_url,
            author: issue.user.and_then(|u| u.login),
            title: issue.title,
            message: issue.body,
            related_issue_ref: Some(issue.number.to_string()),
            related_pr_ref: None,
            related_commit_sha: None,
            related_url: None,
            event_at: issue.updated_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_url_none_when_message_has_no_reference() {
        let (issue_ref, url) = related_url("acme", "widget", "chore: bump deps");
        assert!(issue_ref.is_none());
        assert!(url.is_none());
    }

    #[test]
    fn related_url_builds_issue_link_from_closing_keyword() {
        let (issue_ref, url) = related_url("acme", "widget", "fix: heap overflow, fixes #42");
        assert_eq!(issue_ref.as_deref(), Some("42"));
        assert_eq!(url.as_deref(), Some("https://github.com/acme/widget/issues/42"));
    }
}
