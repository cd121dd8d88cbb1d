//! `ImpactEngine` - fans a published `UpstreamVuln` out to one `client_vulns`
//! row per project that depends on the affected library (spec.md §4.6).
//!
//! Pass-through by design: no version matching happens here. The
//! affected-or-not verdict is Reachability's job.

use sqlx::PgPool;
use vs_core::ids::UpstreamVulnId;
use vs_core::VsResult;
use vs_db::dao::{ClientVulnDao, ProjectDependencyDao, UpstreamVulnDao};
use vs_db::entities::UpstreamVuln;

#[derive(Debug, Default)]
pub struct ImpactReport {
    pub upstream_vuln_id: Option<UpstreamVulnId>,
    pub created_count: usize,
}

pub struct ImpactEngine<'a> {
    pool: &'a PgPool,
}

impl<'a> ImpactEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Process every published vuln with at least one dependent project and
    /// no `client_vulns` row yet (the poll query already excludes rows with
    /// no dependents, so a zero-hit pass here is visibility, not a bug).
    pub async fn process_pending(&self, batch_size: i64) -> VsResult<Vec<ImpactReport>> {
        let upstream_vuln_dao = UpstreamVulnDao::new(self.pool);
        let pending = upstream_vuln_dao.list_pending_impact(batch_size).await?;

        let mut reports = Vec::with_capacity(pending.len());
        for vuln in pending {
            match self.process_vuln(&vuln).await {
                Ok(report) => reports.push(report),
                Err(err) => {
                    tracing::error!(upstream_vuln_id = %vuln.id, error = %err, "impact fan-out failed");
                }
            }
        }
        Ok(reports)
    }

    /// Insert one `client_vulns` row per project dependency on this vuln's
    /// library. Each insert is independently safe under concurrent workers
    /// via the `(upstream_vuln_id, project_id)` unique constraint.
    pub async fn process_vuln(&self, vuln: &UpstreamVuln) -> VsResult<ImpactReport> {
        let dependency_dao = ProjectDependencyDao::new(self.pool);
        let dependents = dependency_dao.list_for_library(vuln.library_id).await?;

        let client_vuln_dao = ClientVulnDao::new(self.pool);
        let mut created_count = 0;
        for dependency in dependents {
            let inserted = client_vuln_dao
                .insert_if_absent(
                    vuln.id,
                    dependency.project_id,
                    dependency.constraint_expr.as_deref(),
                    dependency.resolved_version.as_deref(),
                    Some(dependency.constraint_source.as_str()),
                )
                .await?;
            if inserted.is_some() {
                created_count += 1;
            }
        }

        Ok(ImpactReport { upstream_vuln_id: Some(vuln.id), created_count })
    }
}
