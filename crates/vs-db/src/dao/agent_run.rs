//! AgentRun / AgentToolCall DAO.
//!
//! Both tables are written in one transaction when a run ends (spec.md §3).
//! Conversation content and full tool output never reach the database - only
//! structured counts and a result blob - matching the "Loki vs DB split"
//! design note.

use sqlx::PgPool;
use vs_core::ids::AgentRunId;
use vs_core::VsResult;

use crate::entities::{AgentRun, AgentRunStatus, AgentToolCall};

/// A tool-call record ready to persist, mirroring `AgentContext`'s
/// in-memory accumulator.
#[derive(Debug, Clone)]
pub struct NewToolCall {
    pub turn_index: i32,
    pub sequence: i32,
    pub tool_name: String,
    pub input: serde_json::Value,
    pub output_size: i64,
    pub duration_ms: i64,
    pub is_error: bool,
}

pub struct AgentRunDao<'a> {
    pool: &'a PgPool,
}

impl<'a> AgentRunDao<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write one `AgentRun` row plus its `AgentToolCall` rows in a single
    /// transaction, satisfying spec.md §8 invariant 6
    /// (`total_tool_calls = count(agent_tool_calls where run_id = this
    /// run)`) by construction.
    #[allow(clippy::too_many_arguments)]
    pub async fn persist_run(
        &self,
        id: AgentRunId,
        agent_type: &str,
        engine: &str,
        target_type: &str,
        target_id: uuid::Uuid,
        model: &str,
        turn_count: i32,
        input_tokens: i64,
        output_tokens: i64,
        estimated_cost_usd: f64,
        duration_ms: i64,
        status: AgentRunStatus,
        result: Option<serde_json::Value>,
        error_message: Option<&str>,
        tool_calls: &[NewToolCall],
    ) -> VsResult<()> {
        let mut tx = self.pool.begin().await?;
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO agent_runs (
                id, agent_type, engine, target_type, target_id, model, turn_count,
                input_tokens, output_tokens, estimated_cost_usd, duration_ms, status,
                result, error_message, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
            "#,
        )
        .bind(id)
        .bind(agent_type)
        .bind(engine)
        .bind(target_type)
        .bind(target_id)
        .bind(model)
        .bind(turn_count)
        .bind(input_tokens)
        .bind(output_tokens)
        .bind(estimated_cost_usd)
        .bind(duration_ms)
        .bind(status)
        .bind(&result)
        .bind(error_message)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for call in tool_calls {
            sqlx::query(
                r#"
                INSERT INTO agent_tool_calls (
                    id, run_id, turn_index, sequence, tool_name, input, output_size,
                    duration_ms, is_error, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(uuid::Uuid::new_v4())
            .bind(id)
            .bind(call.turn_index)
            .bind(call.sequence)
            .bind(&call.tool_name)
            .bind(&call.input)
            .bind(call.output_size)
            .bind(call.duration_ms)
            .bind(call.is_error)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: AgentRunId) -> VsResult<Option<AgentRun>> {
        let row = sqlx::query_as::<_, AgentRun>("SELECT * FROM agent_runs WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_tool_calls(&self, run_id: AgentRunId) -> VsResult<Vec<AgentToolCall>> {
        let rows = sqlx::query_as::<_, AgentToolCall>(
            "SELECT * FROM agent_tool_calls WHERE run_id = $1 ORDER BY turn_index, sequence",
        )
        .bind(run_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
