//! Project DAO.

use chrono::Utc;
use sqlx::PgPool;
use vs_core::ids::ProjectId;
use vs_core::VsResult;

use crate::entities::Project;

pub struct ProjectDao<'a> {
    pool: &'a PgPool,
}

impl<'a> ProjectDao<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: ProjectId) -> VsResult<Option<Project>> {
        let row = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Projects due for a Dependency Scanner pass (spec.md §4.2 "Triggers"):
    /// `auto_sync_deps = true AND (last_scanned_at IS NULL OR
    /// last_scanned_at < now() - window)`.
    pub async fn list_due_for_scan(&self, window: chrono::Duration) -> VsResult<Vec<Project>> {
        let cutoff = Utc::now() - window;
        let rows = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE auto_sync_deps = TRUE
              AND (last_scanned_at IS NULL OR last_scanned_at < $1)
            ORDER BY created_at
            "#,
        )
        .bind(cutoff)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_scanned(&self, id: ProjectId) -> VsResult<()> {
        let now = Utc::now();
        sqlx::query("UPDATE projects SET last_scanned_at = $2, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// All projects depending on a given library - used by the Impact
    /// Engine's fan-out and, implicitly, by `list_with_dependency_on` style
    /// backfill tooling.
    pub async fn list_depending_on(
        &self,
        library_id: vs_core::ids::LibraryId,
    ) -> VsResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.* FROM projects p
            JOIN project_dependencies pd ON pd.project_id = p.id
            WHERE pd.library_id = $1
            "#,
        )
        .bind(library_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
