//! `ReachabilityEngine` - the poll/dispatch/advance loop for pending
//! `client_vulns` rows (spec.md §4.7).

use std::sync::Arc;

use sqlx::PgPool;
use vs_core::VsResult;
use vs_db::dao::{ClientVulnDao, ProjectDao, UpstreamVulnDao};
use vs_db::entities::ClientVuln;

use crate::backend::{ReachabilityBackend, ReachabilityError, VulnDescriptor};

pub struct ReachabilityEngine<'a> {
    pool: &'a PgPool,
    backend: Arc<dyn ReachabilityBackend>,
    concurrency: usize,
}

impl<'a> ReachabilityEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool, backend: Arc<dyn ReachabilityBackend>) -> Self {
        Self { pool, backend, concurrency: 3 }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(2, 5);
        self
    }

    /// Process every pending client-vuln, bounded by a semaphore (spec.md
    /// §5: reachability permits 2-5, configurable).
    pub async fn process_pending(&self, batch_size: i64) -> VsResult<usize> {
        let client_vuln_dao = ClientVulnDao::new(self.pool);
        let pending = client_vuln_dao.list_pending_reachability(batch_size).await?;

        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.concurrency));
        let mut tasks = Vec::with_capacity(pending.len());

        for client_vuln in pending {
            let semaphore = semaphore.clone();
            tasks.push(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                match self.process_one(&client_vuln).await {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::error!(client_vuln_id = %client_vuln.id, error = %err, "reachability check failed");
                        false
                    }
                }
            });
        }

        let results = futures::future::join_all(tasks).await;
        Ok(results.into_iter().filter(|ok| *ok).count())
    }

    async fn process_one(&self, client_vuln: &ClientVuln) -> VsResult<()> {
        let client_vuln_dao = ClientVulnDao::new(self.pool);

        let Some(upstream_vuln) = UpstreamVulnDao::new(self.pool).find_by_id(client_vuln.upstream_vuln_id).await?
        else {
            client_vuln_dao.set_reachability_error(client_vuln.id, "upstream vuln no longer exists").await?;
            return Ok(());
        };

        let Some(project) = ProjectDao::new(self.pool).find_by_id(client_vuln.project_id).await? else {
            client_vuln_dao.set_reachability_error(client_vuln.id, "project no longer exists").await?;
            return Ok(());
        };

        let version = client_vuln
            .resolved_version
            .as_deref()
            .or(client_vuln.constraint_expr.as_deref())
            .unwrap_or(project.scan_ref());

        let descriptor = VulnDescriptor {
            vuln_type: upstream_vuln.vuln_type.clone(),
            summary: upstream_vuln.summary.clone(),
            commit_sha: upstream_vuln.commit_sha.clone(),
            affected_functions: upstream_vuln.affected_functions.clone(),
        };

        match self.backend.check_reachability(&project.repo_url, version, &descriptor).await? {
            Ok(verdict) if verdict.is_reachable => {
                client_vuln_dao.mark_verified(client_vuln.id, &verdict.paths).await?;
            }
            Ok(_) => {
                client_vuln_dao.mark_not_affected(client_vuln.id).await?;
            }
            // Only these two collaborator-reported conditions are retryable
            // (spec.md §4.7); every other error, including transport
            // failures, is treated as a terminal "not affected" verdict.
            Err(ReachabilityError::SnapshotNotReady(detail) | ReachabilityError::TargetFunctionsUnresolved(detail)) => {
                client_vuln_dao.set_reachability_error(client_vuln.id, &detail).await?;
            }
            Err(ReachabilityError::Transport(detail)) => {
                tracing::warn!(client_vuln_id = %client_vuln.id, detail, "reachability collaborator call failed, treating as not affected");
                client_vuln_dao.mark_not_affected(client_vuln.id).await?;
            }
        }

        Ok(())
    }
}
