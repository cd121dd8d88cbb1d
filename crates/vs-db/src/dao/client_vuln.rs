//! ClientVuln DAO.
//!
//! `(upstream_vuln_id, project_id)` is unique (spec.md §3, §8 invariant 3),
//! so concurrent Impact Engine workers racing on the same upstream vuln are
//! safe: the loser's insert hits the unique constraint and is swallowed as
//! "already present" (spec.md §7).

use chrono::Utc;
use sqlx::PgPool;
use vs_core::ids::{ClientVulnId, ProjectId, UpstreamVulnId};
use vs_core::{VsError, VsResult};

use crate::entities::{ClientVuln, ClientVulnStatus, PipelineStatus};

pub struct ClientVulnDao<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientVulnDao<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: ClientVulnId) -> VsResult<Option<ClientVuln>> {
        let row = sqlx::query_as::<_, ClientVuln>("SELECT * FROM client_vulns WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert one client-vuln row, denormalizing version fields from the
    /// project's dependency row at creation time (spec.md §4.6). Returns
    /// `Ok(None)` (rather than an error) when the row already exists - the
    /// unique-violation-as-idempotency-conflict case is the expected outcome
    /// under concurrent fan-out, not a failure.
    pub async fn insert_if_absent(
        &self,
        upstream_vuln_id: UpstreamVulnId,
        project_id: ProjectId,
        constraint_expr: Option<&str>,
        resolved_version: Option<&str>,
        constraint_source: Option<&str>,
    ) -> VsResult<Option<ClientVuln>> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ClientVuln>(
            r#"
            INSERT INTO client_vulns (
                id, upstream_vuln_id, project_id, constraint_expr, resolved_version,
                constraint_source, pipeline_status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $7)
            ON CONFLICT (upstream_vuln_id, project_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(ClientVulnId::new())
        .bind(upstream_vuln_id)
        .bind(project_id)
        .bind(constraint_expr)
        .bind(resolved_version)
        .bind(constraint_source)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Pending rows - the Reachability Analyzer's poll query.
    pub async fn list_pending_reachability(&self, limit: i64) -> VsResult<Vec<ClientVuln>> {
        let rows = sqlx::query_as::<_, ClientVuln>(
            "SELECT * FROM client_vulns WHERE pipeline_status = 'pending' ORDER BY created_at LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Verified + recorded rows not yet reported - the Notification Engine's
    /// poll query.
    pub async fn list_pending_notification(&self, limit: i64) -> VsResult<Vec<ClientVuln>> {
        let rows = sqlx::query_as::<_, ClientVuln>(
            r#"
            SELECT * FROM client_vulns
            WHERE pipeline_status = 'verified' AND status = 'recorded'
            ORDER BY created_at
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Transition to `verified`/`recorded` on a reachable verdict (spec.md
    /// §4.7).
    pub async fn mark_verified(
        &self,
        id: ClientVulnId,
        reachable_path: &serde_json::Value,
    ) -> VsResult<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE client_vulns SET
                pipeline_status = 'verified',
                status = 'recorded',
                is_affected = TRUE,
                reachable_path = $2,
                recorded_at = $3,
                error_message = NULL,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reachable_path)
        .bind(now)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Transition to `not_affect` on an unreachable verdict or a terminal
    /// collaborator error (spec.md §4.7).
    pub async fn mark_not_affected(&self, id: ClientVulnId) -> VsResult<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE client_vulns SET
                pipeline_status = 'not_affect',
                status = 'not_affect',
                is_affected = FALSE,
                not_affect_at = $2,
                error_message = NULL,
                updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Record a recoverable reachability error without advancing the
    /// pipeline - `pipeline_status` stays `pending` for a later retry
    /// (spec.md §4.7, §7).
    pub async fn set_reachability_error(&self, id: ClientVulnId, error_message: &str) -> VsResult<()> {
        sqlx::query("UPDATE client_vulns SET error_message = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(error_message)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Mark a verified/recorded row as reported after a successful
    /// notification dispatch (spec.md §4.8).
    pub async fn mark_reported(&self, id: ClientVulnId) -> VsResult<()> {
        self.transition_status(id, ClientVulnStatus::Reported).await?;
        let now = Utc::now();
        sqlx::query("UPDATE client_vulns SET reported_at = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Operator-driven transition (confirmed, fixed). Validates against the
    /// allowed graph in spec.md §8 invariant 5 before writing - an invalid
    /// transition is rejected at the service boundary, not retried
    /// (spec.md §7).
    pub async fn transition_status(&self, id: ClientVulnId, next: ClientVulnStatus) -> VsResult<()> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| VsError::Internal(anyhow::anyhow!("client_vuln {id} not found")))?;

        if !current.can_transition_to(next) {
            return Err(VsError::InvalidTransition {
                from: current
                    .status
                    .map(|s| format!("{s:?}"))
                    .unwrap_or_else(|| "null".to_string()),
                to: format!("{next:?}"),
            });
        }

        let now = Utc::now();
        let timestamp_column = match next {
            ClientVulnStatus::Confirmed => Some("confirmed_at"),
            ClientVulnStatus::Fixed => Some("fixed_at"),
            _ => None,
        };

        if let Some(col) = timestamp_column {
            let sql = format!("UPDATE client_vulns SET status = $2, {col} = $3, updated_at = $3 WHERE id = $1");
            sqlx::query(&sql)
                .bind(id)
                .bind(next)
                .bind(now)
                .execute(self.pool)
                .await?;
        } else {
            sqlx::query("UPDATE client_vulns SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(next)
                .bind(now)
                .execute(self.pool)
                .await?;
        }

        Ok(())
    }

    /// All pipeline stages in one place for `pending -> path_searching ->
    /// poc_generating` advancement, reserved for the future PoC-generation
    /// extension described in spec.md §4.7 "Future extension".
    pub async fn advance_pipeline(&self, id: ClientVulnId, next: PipelineStatus) -> VsResult<()> {
        sqlx::query("UPDATE client_vulns SET pipeline_status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(next)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
