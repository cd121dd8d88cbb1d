//! `AgentContext` - per-run mutable accumulator (spec.md §4.1).

use vs_core::ids::AgentRunId;
use vs_db::dao::agent_run::NewToolCall;
use vs_db::entities::AgentRunStatus;

use crate::client::TokenUsage;

/// One tool-call record gathered during the loop, before it is flattened
/// into a `NewToolCall` for persistence.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub turn: i32,
    pub sequence: i32,
    pub name: String,
    pub input: serde_json::Value,
    pub output_size: usize,
    pub duration_ms: i64,
    pub is_error: bool,
}

pub struct AgentContext {
    pub run_id: AgentRunId,
    pub agent_type: String,
    pub engine: String,
    pub target_type: String,
    pub target_id: uuid::Uuid,
    pub model: String,
    pub turn: i32,
    pub total_input_tokens: u32,
    pub total_output_tokens: u32,
    pub total_cost_usd: f64,
    pub tool_calls: Vec<ToolCallRecord>,
    pub status: AgentRunStatus,
    pub error_message: Option<String>,
    cancelled: std::sync::atomic::AtomicBool,
    started_at: std::time::Instant,
}

impl AgentContext {
    #[must_use]
    pub fn new(agent_type: &str, engine: &str, model: &str, target_type: &str, target_id: uuid::Uuid) -> Self {
        Self {
            run_id: AgentRunId::new(),
            agent_type: agent_type.to_string(),
            engine: engine.to_string(),
            target_type: target_type.to_string(),
            target_id,
            model: model.to_string(),
            turn: 0,
            total_input_tokens: 0,
            total_output_tokens: 0,
            total_cost_usd: 0.0,
            tool_calls: Vec::new(),
            status: AgentRunStatus::Running,
            error_message: None,
            cancelled: std::sync::atomic::AtomicBool::new(false),
            started_at: std::time::Instant::now(),
        }
    }

    pub fn add_usage(&mut self, usage: &TokenUsage, cost_usd: f64) {
        self.total_input_tokens += usage.input_tokens;
        self.total_output_tokens += usage.output_tokens;
        self.total_cost_usd += cost_usd;
    }

    pub fn record_tool_call(&mut self, record: ToolCallRecord) {
        self.tool_calls.push(record);
    }

    /// Checked at each loop iteration (spec.md §4.1 concurrency invariants).
    pub fn cancel(&self) {
        self.cancelled.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.started_at.elapsed().as_millis() as i64
    }

    #[must_use]
    pub fn new_tool_calls(&self) -> Vec<NewToolCall> {
        self.tool_calls
            .iter()
            .map(|r| NewToolCall {
                turn_index: r.turn,
                sequence: r.sequence,
                tool_name: r.name.clone(),
                input: r.input.clone(),
                output_size: r.output_size as i64,
                duration_ms: r.duration_ms,
                is_error: r.is_error,
            })
            .collect()
    }
}

/// The outcome snapshot returned from `BaseAgent::run()`.
#[derive(Debug, Clone)]
pub struct AgentResult<T> {
    pub run_id: AgentRunId,
    pub status: AgentRunStatus,
    pub turn_count: i32,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub estimated_cost_usd: f64,
    pub duration_ms: i64,
    pub parsed: Option<T>,
    pub error_message: Option<String>,
}
