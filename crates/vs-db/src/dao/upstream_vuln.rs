//! UpstreamVuln DAO.
//!
//! Implements the placeholder-before-analysis reservation from spec.md §4.5
//! and §9: `create()` inserts an `analyzing` row before the agent runs, which
//! makes the event invisible to the Analyzer's poll query
//! (`list_unanalyzed_bugfixes` joins on `NOT EXISTS upstream_vulns`).

use chrono::Utc;
use serde_json::Value as Json;
use sqlx::PgPool;
use vs_core::ids::{EventId, LibraryId, UpstreamVulnId};
use vs_core::VsResult;

use crate::entities::{Severity, UpstreamVuln, UpstreamVulnStatus};

pub struct UpstreamVulnDao<'a> {
    pool: &'a PgPool,
}

/// The fields a successful analysis extracts, in normalized form.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub vuln_type: String,
    pub severity: Severity,
    pub affected_versions: String,
    pub summary: String,
    pub reasoning: String,
    pub upstream_poc: Option<Json>,
    pub affected_functions: Option<Vec<String>>,
}

impl<'a> UpstreamVulnDao<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: UpstreamVulnId) -> VsResult<Option<UpstreamVuln>> {
        let row = sqlx::query_as::<_, UpstreamVuln>("SELECT * FROM upstream_vulns WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert the `analyzing` placeholder reserving this event/commit for
    /// analysis. Called once per result the agent emits: the first call
    /// reserves the event, subsequent calls (for multi-vuln commits) each
    /// reserve their own row.
    pub async fn create(
        &self,
        event_id: EventId,
        library_id: LibraryId,
        commit_sha: &str,
    ) -> VsResult<UpstreamVuln> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UpstreamVuln>(
            r#"
            INSERT INTO upstream_vulns (
                id, event_id, library_id, commit_sha, vuln_type, severity, affected_versions,
                summary, reasoning, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, '', 'low', '', '', '', 'analyzing', $5, $5)
            RETURNING *
            "#,
        )
        .bind(UpstreamVulnId::new())
        .bind(event_id)
        .bind(library_id)
        .bind(commit_sha)
        .bind(now)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Fill in the extracted fields on a placeholder row, without
    /// publishing it yet.
    pub async fn update_analysis(&self, id: UpstreamVulnId, result: &AnalysisResult) -> VsResult<()> {
        sqlx::query(
            r#"
            UPDATE upstream_vulns SET
                vuln_type = $2,
                severity = $3,
                affected_versions = $4,
                summary = $5,
                reasoning = $6,
                upstream_poc = $7,
                affected_functions = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&result.vuln_type)
        .bind(result.severity)
        .bind(&result.affected_versions)
        .bind(&result.summary)
        .bind(&result.reasoning)
        .bind(&result.upstream_poc)
        .bind(&result.affected_functions)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Move a row from `analyzing` to `published`, stamping `published_at`.
    pub async fn publish(&self, id: UpstreamVulnId) -> VsResult<()> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE upstream_vulns SET status = $2, published_at = $3, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(UpstreamVulnStatus::Published)
        .bind(now)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Record a failure without disturbing `status` - it stays `analyzing`
    /// so the row remains a durable reservation and `error_message` signals
    /// the failure for operator visibility (spec.md §4.5 step 5, §7).
    pub async fn set_error(&self, id: UpstreamVulnId, error_message: &str) -> VsResult<()> {
        sqlx::query("UPDATE upstream_vulns SET error_message = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(error_message)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Published vulns with at least one dependent project and no
    /// `client_vulns` yet - the Impact Engine's poll query (spec.md §4.6).
    pub async fn list_pending_impact(&self, limit: i64) -> VsResult<Vec<UpstreamVuln>> {
        let rows = sqlx::query_as::<_, UpstreamVuln>(
            r#"
            SELECT uv.* FROM upstream_vulns uv
            WHERE uv.status = 'published'
              AND NOT EXISTS (SELECT 1 FROM client_vulns cv WHERE cv.upstream_vuln_id = uv.id)
              AND EXISTS (SELECT 1 FROM project_dependencies pd WHERE pd.library_id = uv.library_id)
            ORDER BY uv.created_at
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
