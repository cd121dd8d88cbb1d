//! Event DAO.
//!
//! `(library_id, type, ref)` uniqueness makes batch inserts idempotent - see
//! spec.md §3 and §8 invariant 7 (running the Collector twice yields zero
//! net inserts).

use chrono::Utc;
use sqlx::PgPool;
use vs_core::ids::{EventId, LibraryId};
use vs_core::VsResult;

use crate::entities::{Event, EventClassification, EventType};

/// A single observation ready to be inserted, before it has an id.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub library_id: LibraryId,
    pub r#type: EventType,
    pub r#ref: String,
    pub source_url: String,
    pub author: Option<String>,
    pub title: String,
    pub message: Option<String>,
    pub related_issue_ref: Option<String>,
    pub related_pr_ref: Option<String>,
    pub related_commit_sha: Option<String>,
    pub related_url: Option<String>,
    pub event_at: chrono::DateTime<Utc>,
}

pub struct EventDao<'a> {
    pool: &'a PgPool,
}

impl<'a> EventDao<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: EventId) -> VsResult<Option<Event>> {
        let row = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Batch-insert events with `ON CONFLICT (library_id, type, ref) DO
    /// NOTHING`, returning only the rows that were actually inserted (new
    /// observations). Running this twice on the same input inserts nothing
    /// the second time.
    pub async fn insert_batch(&self, events: &[NewEvent]) -> VsResult<Vec<Event>> {
        let mut inserted = Vec::with_capacity(events.len());
        let now = Utc::now();

        // A single multi-row INSERT would be faster, but per-row keeps the
        // conflict-skip logic obviously correct and lets one malformed event
        // fail without rolling back the whole batch when called outside a
        // transaction.
        for event in events {
            let row = sqlx::query_as::<_, Event>(
                r#"
                INSERT INTO events (
                    id, library_id, event_type, ref, source_url, author, title, message,
                    related_issue_ref, related_pr_ref, related_commit_sha, related_url,
                    event_at, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
                ON CONFLICT (library_id, event_type, ref) DO NOTHING
                RETURNING *
                "#,
            )
            .bind(EventId::new())
            .bind(event.library_id)
            .bind(event.r#type)
            .bind(&event.r#ref)
            .bind(&event.source_url)
            .bind(&event.author)
            .bind(&event.title)
            .bind(&event.message)
            .bind(&event.related_issue_ref)
            .bind(&event.related_pr_ref)
            .bind(&event.related_commit_sha)
            .bind(&event.related_url)
            .bind(event.event_at)
            .bind(now)
            .fetch_optional(self.pool)
            .await?;

            if let Some(row) = row {
                inserted.push(row);
            }
        }

        Ok(inserted)
    }

    /// Events awaiting classification, oldest first - the Classifier's poll
    /// query.
    pub async fn list_unclassified(&self, limit: i64) -> VsResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE classification IS NULL ORDER BY created_at LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Bugfix events with no linked `upstream_vulns` row yet - the Analyzer's
    /// poll query.
    pub async fn list_unanalyzed_bugfixes(&self, limit: i64) -> VsResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.* FROM events e
            WHERE e.classification = 'security_bugfix'
              AND NOT EXISTS (SELECT 1 FROM upstream_vulns uv WHERE uv.event_id = e.id)
            ORDER BY e.created_at
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Set the classification exactly once. Idempotent/last-writer-wins per
    /// spec.md §5: a concurrent duplicate update is harmless because the
    /// result is deterministic for a given event.
    pub async fn set_classification(
        &self,
        id: EventId,
        classification: EventClassification,
        confidence: f32,
    ) -> VsResult<()> {
        sqlx::query(
            "UPDATE events SET classification = $2, confidence = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(id)
        .bind(classification)
        .bind(confidence)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;
        Ok(())
    }
}
