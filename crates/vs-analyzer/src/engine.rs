//! `AnalyzerEngine` - wires `VulnAnalyzerAgent` into the placeholder-before-
//! analysis lifecycle from spec.md §4.5.

use std::sync::Arc;

use sqlx::PgPool;
use vs_agent::base_agent::BaseAgent;
use vs_agent::registry::ProviderRegistry;
use vs_core::ids::UpstreamVulnId;
use vs_core::repo_ref::owner_repo;
use vs_core::VsResult;
use vs_db::dao::upstream_vuln::AnalysisResult;
use vs_db::dao::{EventDao, LibraryDao, UpstreamVulnDao};
use vs_db::entities::{AgentRunStatus, Event, EventType};
use vs_github::GitHubClient;

use crate::agent::VulnAnalyzerAgent;
use crate::severity::normalize_severity;

pub struct AnalyzerEngine<'a> {
    pool: &'a PgPool,
    github: Arc<GitHubClient>,
    registry: Arc<ProviderRegistry>,
    concurrency: usize,
}

impl<'a> AnalyzerEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool, github: Arc<GitHubClient>, registry: Arc<ProviderRegistry>) -> Self {
        Self { pool, github, registry, concurrency: 3 }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Analyze every unanalyzed bugfix event, bounded by a semaphore (spec.md
    /// §5: analyzer concurrency permits default 3).
    pub async fn analyze_pending(&self, batch_size: i64) -> VsResult<usize> {
        let event_dao = EventDao::new(self.pool);
        let pending = event_dao.list_unanalyzed_bugfixes(batch_size).await?;

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(pending.len());

        for event in pending {
            let semaphore = semaphore.clone();
            tasks.push(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                match self.analyze_event(&event).await {
                    Ok(count) => count,
                    Err(err) => {
                        tracing::error!(event_id = %event.id, error = %err, "vuln analysis failed");
                        0
                    }
                }
            });
        }

        let results = futures::future::join_all(tasks).await;
        Ok(results.into_iter().sum())
    }

    /// Run the full lifecycle for one bugfix event: placeholder reservation,
    /// agent run, per-result persistence, failure handling. Returns the
    /// number of `upstream_vulns` rows published.
    pub async fn analyze_event(&self, event: &Event) -> VsResult<usize> {
        let Some(commit_sha) = commit_sha_for(event) else {
            tracing::warn!(event_id = %event.id, "bugfix event carries no resolvable commit sha, skipping");
            return Ok(0);
        };

        let upstream_vuln_dao = UpstreamVulnDao::new(self.pool);
        let placeholder = upstream_vuln_dao.create(event.id, event.library_id, &commit_sha).await?;

        let library_dao = LibraryDao::new(self.pool);
        let Some(library) = library_dao.find_by_id(event.library_id).await? else {
            upstream_vuln_dao.set_error(placeholder.id, "library no longer exists").await?;
            return Ok(0);
        };
        let (owner, repo) = owner_repo(&library.repo_url)?;

        let agent = VulnAnalyzerAgent {
            github: self.github.clone(),
            owner,
            repo,
            event_title: event.title.clone(),
            event_message: event.message.clone(),
            event_ref: event.r#ref.clone(),
            related_issue_ref: event.related_issue_ref.clone(),
        };

        let result = agent.run(&self.registry, Some(self.pool), "event", event.id.as_uuid()).await;

        if result.status != AgentRunStatus::Completed {
            let message = result.error_message.unwrap_or_else(|| "agent run did not complete".to_string());
            upstream_vuln_dao.set_error(placeholder.id, &message).await?;
            return Ok(0);
        }

        let results = match result.parsed.as_ref().and_then(|v| v.as_array()).filter(|a| !a.is_empty()) {
            Some(results) => results.clone(),
            None => {
                upstream_vuln_dao.set_error(placeholder.id, "agent returned no parseable results").await?;
                return Ok(0);
            }
        };

        let mut published = 0;
        for (index, raw) in results.iter().enumerate() {
            let analysis = match parse_analysis_result(raw) {
                Ok(analysis) => analysis,
                Err(err) => {
                    tracing::error!(event_id = %event.id, error = %err, "skipping unparseable analyzer result");
                    continue;
                }
            };

            let row_id: UpstreamVulnId = if index == 0 {
                placeholder.id
            } else {
                upstream_vuln_dao.create(event.id, event.library_id, &commit_sha).await?.id
            };

            upstream_vuln_dao.update_analysis(row_id, &analysis).await?;
            upstream_vuln_dao.publish(row_id).await?;
            published += 1;
        }

        if published == 0 {
            upstream_vuln_dao.set_error(placeholder.id, "no analyzer result parsed into a valid row").await?;
        }

        Ok(published)
    }
}

/// Per spec.md §4.3 event shapes: only commit, PR-merge and tag events carry
/// a resolvable fix commit sha; bug-issue events do not.
fn commit_sha_for(event: &Event) -> Option<String> {
    match event.r#type {
        EventType::Commit => Some(event.r#ref.clone()),
        EventType::PrMerge | EventType::Tag => event.related_commit_sha.clone(),
        EventType::BugIssue => None,
    }
}

fn parse_analysis_result(raw: &serde_json::Value) -> VsResult<AnalysisResult> {
    let vuln_type = raw
        .get("vuln_type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| vs_core::VsError::ParseSchema("analyzer result missing vuln_type".to_string()))?
        .to_string();
    let severity = normalize_severity(raw.get("severity").and_then(serde_json::Value::as_str).unwrap_or("medium"));
    let affected_versions = raw
        .get("affected_versions")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let summary = raw.get("summary").and_then(serde_json::Value::as_str).unwrap_or_default().to_string();
    let reasoning = raw.get("reasoning").and_then(serde_json::Value::as_str).unwrap_or_default().to_string();
    let upstream_poc = raw.get("upstream_poc").filter(|v| !v.is_null()).cloned();
    let affected_functions = raw.get("affected_functions").and_then(|v| {
        v.as_array().map(|arr| arr.iter().filter_map(|f| f.as_str().map(str::to_string)).collect())
    });

    Ok(AnalysisResult { vuln_type, severity, affected_versions, summary, reasoning, upstream_poc, affected_functions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_well_formed_result() {
        let raw = json!({
            "vuln_type": "buffer overflow",
            "severity": "High",
            "affected_versions": "< 2.0.0",
            "summary": "...",
            "reasoning": "...",
            "upstream_poc": null,
            "affected_functions": ["parse_header"]
        });
        let parsed = parse_analysis_result(&raw).unwrap();
        assert_eq!(parsed.vuln_type, "buffer overflow");
        assert_eq!(parsed.severity, vs_db::entities::Severity::High);
        assert_eq!(parsed.affected_functions, Some(vec!["parse_header".to_string()]));
    }

    #[test]
    fn rejects_a_result_missing_vuln_type() {
        let raw = json!({"severity": "low"});
        assert!(parse_analysis_result(&raw).is_err());
    }
}
