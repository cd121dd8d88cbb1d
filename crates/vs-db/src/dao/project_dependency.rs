//! ProjectDependency DAO.
//!
//! Co-owned by the Scanner (non-manual rows) and the user (manual rows); see
//! spec.md §3 and the "Constraint_source is a discriminator" design note.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use vs_core::ids::{LibraryId, ProjectId};
use vs_core::VsResult;

use crate::entities::{ProjectDependency, CONSTRAINT_SOURCE_MANUAL};

pub struct ProjectDependencyDao<'a> {
    pool: &'a PgPool,
}

impl<'a> ProjectDependencyDao<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_project(&self, project_id: ProjectId) -> VsResult<Vec<ProjectDependency>> {
        let rows = sqlx::query_as::<_, ProjectDependency>(
            "SELECT * FROM project_dependencies WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_library(&self, library_id: LibraryId) -> VsResult<Vec<ProjectDependency>> {
        let rows = sqlx::query_as::<_, ProjectDependency>(
            "SELECT * FROM project_dependencies WHERE library_id = $1",
        )
        .bind(library_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find(
        &self,
        project_id: ProjectId,
        library_id: LibraryId,
    ) -> VsResult<Option<ProjectDependency>> {
        let row = sqlx::query_as::<_, ProjectDependency>(
            "SELECT * FROM project_dependencies WHERE project_id = $1 AND library_id = $2",
        )
        .bind(project_id)
        .bind(library_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a manual, user-entered dependency row. The API layer is
    /// responsible for hard-setting `constraint_source = 'manual'` - it is
    /// never present in the client request schema (spec.md §9 design note).
    pub async fn insert_manual(
        &self,
        project_id: ProjectId,
        library_id: LibraryId,
        constraint_expr: Option<&str>,
        resolved_version: Option<&str>,
    ) -> VsResult<ProjectDependency> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ProjectDependency>(
            r#"
            INSERT INTO project_dependencies
                (id, project_id, library_id, constraint_expr, resolved_version, constraint_source, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (project_id, library_id) DO UPDATE SET
                constraint_expr = EXCLUDED.constraint_expr,
                resolved_version = EXCLUDED.resolved_version,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(library_id)
        .bind(constraint_expr)
        .bind(resolved_version)
        .bind(CONSTRAINT_SOURCE_MANUAL)
        .bind(now)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Upsert a scanner-derived dependency row (spec.md §4.2 step 5).
    ///
    /// On conflict, `constraint_expr`/`resolved_version` are always
    /// overwritten (the manifest is authoritative for version), but
    /// `constraint_source` is only overwritten when the existing row is not
    /// already `'manual'` - the scanner must never clobber a user-entered
    /// marker.
    pub async fn upsert_from_scan(
        &self,
        project_id: ProjectId,
        library_id: LibraryId,
        constraint_expr: Option<&str>,
        resolved_version: Option<&str>,
        source_file: &str,
    ) -> VsResult<ProjectDependency> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ProjectDependency>(
            r#"
            INSERT INTO project_dependencies
                (id, project_id, library_id, constraint_expr, resolved_version, constraint_source, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ON CONFLICT (project_id, library_id) DO UPDATE SET
                constraint_expr = EXCLUDED.constraint_expr,
                resolved_version = EXCLUDED.resolved_version,
                constraint_source = CASE
                    WHEN project_dependencies.constraint_source = 'manual' THEN project_dependencies.constraint_source
                    ELSE EXCLUDED.constraint_source
                END,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(library_id)
        .bind(constraint_expr)
        .bind(resolved_version)
        .bind(source_file)
        .bind(now)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Delete scanner-owned rows for `project_id` whose `library_id` is not
    /// in `still_present`, per spec.md §4.2 step 7. Rows with
    /// `constraint_source = 'manual'` are never touched by this query.
    pub async fn delete_vanished(
        &self,
        project_id: ProjectId,
        still_present: &[LibraryId],
    ) -> VsResult<u64> {
        let still_present_uuids: Vec<Uuid> = still_present.iter().map(|id| id.as_uuid()).collect();
        let result = sqlx::query(
            r#"
            DELETE FROM project_dependencies
            WHERE project_id = $1
              AND constraint_source <> 'manual'
              AND library_id <> ALL($2::uuid[])
            "#,
        )
        .bind(project_id)
        .bind(&still_present_uuids)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_sentinel_is_lowercase_and_stable() {
        // Regression guard: the sentinel string is a wire/DB contract, not
        // an implementation detail that can be casually renamed.
        assert_eq!(CONSTRAINT_SOURCE_MANUAL, "manual");
    }
}
