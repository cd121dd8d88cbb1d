//! Library DAO.
//!
//! Owns the `(name)` uniqueness invariant from spec.md §3: a name conflict
//! with a different `repo_url` is rejected rather than silently repointing
//! an existing library at a fork.

use chrono::Utc;
use sqlx::PgPool;
use vs_core::ids::LibraryId;
use vs_core::{VsError, VsResult};

use crate::entities::{Library, Platform};

pub struct LibraryDao<'a> {
    pool: &'a PgPool,
}

impl<'a> LibraryDao<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: LibraryId) -> VsResult<Option<Library>> {
        let row = sqlx::query_as::<_, Library>("SELECT * FROM libraries WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_name(&self, name: &str) -> VsResult<Option<Library>> {
        let row = sqlx::query_as::<_, Library>("SELECT * FROM libraries WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Upsert a library by unique `name`. Rejects the write if the name
    /// already exists under a *different* `repo_url` - this is the only
    /// guard against a fork silently taking over a monitored library
    /// (spec.md §3 invariant).
    pub async fn upsert(
        &self,
        name: &str,
        repo_url: &str,
        platform: Platform,
        default_branch: &str,
    ) -> VsResult<Library> {
        if let Some(existing) = self.find_by_name(name).await? {
            if existing.repo_url != repo_url {
                return Err(VsError::IdempotencyConflict(format!(
                    "library '{name}' already exists with repo_url '{}', refusing to repoint to '{repo_url}'",
                    existing.repo_url
                )));
            }
            return Ok(existing);
        }

        let row = sqlx::query_as::<_, Library>(
            r#"
            INSERT INTO libraries (id, name, repo_url, platform, default_branch, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (name) DO UPDATE SET updated_at = libraries.updated_at
            RETURNING *
            "#,
        )
        .bind(LibraryId::new())
        .bind(name)
        .bind(repo_url)
        .bind(platform)
        .bind(default_branch)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Advance `latest_commit_sha`/`latest_tag_version`/`last_activity_at`.
    /// `None` values leave the existing column untouched (COALESCE
    /// semantics), matching spec.md §4.3's pointer-update rule.
    pub async fn advance_pointers(
        &self,
        id: LibraryId,
        latest_commit_sha: Option<&str>,
        latest_tag_version: Option<&str>,
        bump_activity: bool,
    ) -> VsResult<()> {
        sqlx::query(
            r#"
            UPDATE libraries SET
                latest_commit_sha = COALESCE($2, latest_commit_sha),
                latest_tag_version = COALESCE($3, latest_tag_version),
                last_activity_at = CASE WHEN $4 THEN $5 ELSE last_activity_at END,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(latest_commit_sha)
        .bind(latest_tag_version)
        .bind(bump_activity)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Libraries whose `last_activity_at` is older than `window`, or whose
    /// activity has never been recorded - these are due for an Event
    /// Collector pass (spec.md §4.3).
    pub async fn list_due_for_collection(
        &self,
        window: chrono::Duration,
    ) -> VsResult<Vec<Library>> {
        let cutoff = Utc::now() - window;
        let rows = sqlx::query_as::<_, Library>(
            "SELECT * FROM libraries WHERE last_activity_at IS NULL OR last_activity_at < $1 ORDER BY created_at",
        )
        .bind(cutoff)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
