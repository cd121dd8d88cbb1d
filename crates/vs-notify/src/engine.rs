//! `NotificationEngine` - the find-candidates/dispatch/advance-status loop
//! (spec.md §4.8). Owns only the loop; channel delivery is a collaborator.

use sqlx::PgPool;
use vs_core::VsResult;
use vs_db::dao::{ClientVulnDao, LibraryDao, ProjectDao, UpstreamVulnDao};
use vs_db::entities::ClientVuln;

use crate::notice::VulnNotice;
use crate::notifier::Notifier;

pub struct NotificationEngine<'a> {
    pool: &'a PgPool,
    notifier: Notifier,
}

impl<'a> NotificationEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool, notifier: Notifier) -> Self {
        Self { pool, notifier }
    }

    /// Notify every verified-and-recorded client-vuln not yet reported.
    pub async fn process_pending(&self, batch_size: i64) -> VsResult<usize> {
        let client_vuln_dao = ClientVulnDao::new(self.pool);
        let pending = client_vuln_dao.list_pending_notification(batch_size).await?;

        let mut notified = 0;
        for client_vuln in pending {
            match self.process_one(&client_vuln).await {
                Ok(true) => notified += 1,
                Ok(false) => {
                    // A failed notification holds status at `recorded`; a
                    // later tick retries (spec.md §7).
                }
                Err(err) => {
                    tracing::error!(client_vuln_id = %client_vuln.id, error = %err, "notification dispatch failed");
                }
            }
        }
        Ok(notified)
    }

    async fn process_one(&self, client_vuln: &ClientVuln) -> VsResult<bool> {
        let Some(notice) = self.build_notice(client_vuln).await? else {
            tracing::warn!(client_vuln_id = %client_vuln.id, "could not build notice, missing related row");
            return Ok(false);
        };

        let results = self.notifier.notify_and_wait(&notice).await;
        let mut any_succeeded = false;
        for (channel, result) in &results {
            match result {
                Ok(()) => any_succeeded = true,
                Err(err) => {
                    tracing::warn!(client_vuln_id = %client_vuln.id, channel, error = %err, "channel delivery failed");
                }
            }
        }

        if !any_succeeded {
            return Ok(false);
        }

        ClientVulnDao::new(self.pool).mark_reported(client_vuln.id).await?;
        Ok(true)
    }

    async fn build_notice(&self, client_vuln: &ClientVuln) -> VsResult<Option<VulnNotice>> {
        let Some(upstream_vuln) = UpstreamVulnDao::new(self.pool).find_by_id(client_vuln.upstream_vuln_id).await?
        else {
            return Ok(None);
        };
        let Some(project) = ProjectDao::new(self.pool).find_by_id(client_vuln.project_id).await? else {
            return Ok(None);
        };
        let Some(library) = LibraryDao::new(self.pool).find_by_id(upstream_vuln.library_id).await? else {
            return Ok(None);
        };

        Ok(Some(VulnNotice {
            client_vuln_id: client_vuln.id.to_string(),
            project_name: project.name,
            project_contact: project.contact,
            library_name: library.name,
            vuln_type: upstream_vuln.vuln_type,
            severity: upstream_vuln.severity,
            summary: upstream_vuln.summary,
            affected_versions: upstream_vuln.affected_versions,
            fix_version: client_vuln.fix_version.clone(),
            recorded_at: client_vuln.recorded_at.unwrap_or_else(chrono::Utc::now),
        }))
    }
}
