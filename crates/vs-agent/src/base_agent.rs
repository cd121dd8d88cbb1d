//! The tool-use loop (spec.md §4.1 steps 1-8), shared by every LLM-driven
//! engine. Subclasses (`EventClassifierAgent`, `VulnAnalyzerAgent`) provide
//! the system prompt, the initial user message, the early-stop hook, and the
//! result parser; `BaseAgent::run` owns everything else.

use std::sync::Arc;

use async_trait::async_trait;
use vs_core::VsResult;
use vs_db::dao::agent_run::AgentRunDao;
use vs_db::entities::AgentRunStatus;

use crate::client::{ChatMessage, CompletionRequest, LlmClient, Role, StopReason};
use crate::compression::compress_messages;
use crate::context::{AgentContext, AgentResult, ToolCallRecord};
use crate::registry::ProviderRegistry;
use crate::tools::ToolServer;

/// Subclass-level configuration (spec.md §4.1 "Configuration surface").
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub agent_type: &'static str,
    pub engine: &'static str,
    pub max_turns: i32,
    pub temperature: f32,
    pub model: String,
    pub enable_compression: bool,
    pub max_tool_output_tokens: u32,
    pub max_context_tokens: u32,
}

impl AgentConfig {
    #[must_use]
    pub fn new(agent_type: &'static str, engine: &'static str) -> Self {
        Self {
            agent_type,
            engine,
            max_turns: 10,
            temperature: 0.2,
            model: "deepseek/deepseek-chat".to_string(),
            enable_compression: false,
            max_tool_output_tokens: 4_000,
            max_context_tokens: 16_000,
        }
    }
}

#[async_trait]
pub trait BaseAgent: Send + Sync {
    fn config(&self) -> AgentConfig;

    /// System prompt for this agent run (subclass-provided).
    fn system_prompt(&self) -> String;

    /// The initial user message (subclass-provided), given the target id.
    fn initial_message(&self, target_id: uuid::Uuid) -> String;

    /// Build the per-run tool server (subclass-provided - closes over
    /// per-run dependencies such as the GitHub client and repo coordinates).
    fn build_tools(&self) -> ToolServer;

    /// Early-termination hook, e.g. "a JSON object appeared in the response".
    fn should_stop(&self, _content: &str) -> bool {
        false
    }

    /// Urgency message injected on the penultimate turn, if any.
    fn urgency_message(&self, _turn: i32, _max_turns: i32) -> Option<String> {
        None
    }

    /// Compression criteria passed to the cheap summarizer model.
    fn compression_criteria(&self) -> String {
        "Summarize the tool outputs and reasoning so far, keeping any concrete facts \
         (file names, line numbers, function names, CVE/CWE identifiers) that later turns \
         will need."
            .to_string()
    }

    /// Extract the structured result from the final assistant content.
    fn parse_result(&self, content: &str) -> VsResult<serde_json::Value>;

    /// Run the loop end to end (spec.md §4.1 steps 1-8).
    async fn run(
        &self,
        registry: &ProviderRegistry,
        pool: Option<&sqlx::PgPool>,
        target_type: &str,
        target_id: uuid::Uuid,
    ) -> AgentResult<serde_json::Value> {
        let config = self.config();
        let client = match registry.get_for_model(&config.model) {
            Ok(c) => c,
            Err(e) => {
                return AgentResult {
                    run_id: vs_core::ids::AgentRunId::new(),
                    status: AgentRunStatus::Failed,
                    turn_count: 0,
                    input_tokens: 0,
                    output_tokens: 0,
                    estimated_cost_usd: 0.0,
                    duration_ms: 0,
                    parsed: None,
                    error_message: Some(e.to_string()),
                };
            }
        };

        let mut ctx = AgentContext::new(config.agent_type, config.engine, &config.model, target_type, target_id);
        let span = tracing::info_span!(
            "agent_run",
            run_id = %ctx.run_id,
            agent_type = config.agent_type,
            target_id = %target_id,
        );
        let _enter = span.enter();

        let tools = self.build_tools();
        let descriptors = tools.descriptors();

        let mut messages = vec![ChatMessage::user(self.initial_message(target_id))];
        let system_prompt = self.system_prompt();

        let final_content = match self
            .run_loop(&*client, &tools, &descriptors, &system_prompt, &mut messages, &mut ctx, &config)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                ctx.status = AgentRunStatus::Failed;
                ctx.error_message = Some(e.to_string());
                String::new()
            }
        };

        let parsed = if ctx.status != AgentRunStatus::Failed {
            match self.parse_result(&final_content) {
                Ok(value) => {
                    ctx.status = AgentRunStatus::Completed;
                    Some(value)
                }
                Err(e) => {
                    ctx.status = AgentRunStatus::Failed;
                    ctx.error_message = Some(e.to_string());
                    None
                }
            }
        } else {
            None
        };

        if let Some(pool) = pool {
            let dao = AgentRunDao::new(pool);
            let _ = dao
                .persist_run(
                    ctx.run_id,
                    config.agent_type,
                    config.engine,
                    target_type,
                    target_id,
                    &config.model,
                    ctx.turn,
                    i64::from(ctx.total_input_tokens),
                    i64::from(ctx.total_output_tokens),
                    ctx.total_cost_usd,
                    ctx.duration_ms(),
                    ctx.status,
                    parsed.clone(),
                    ctx.error_message.as_deref(),
                    &ctx.new_tool_calls(),
                )
                .await;
        }

        AgentResult {
            run_id: ctx.run_id,
            status: ctx.status,
            turn_count: ctx.turn,
            input_tokens: ctx.total_input_tokens,
            output_tokens: ctx.total_output_tokens,
            estimated_cost_usd: ctx.total_cost_usd,
            duration_ms: ctx.duration_ms(),
            parsed,
            error_message: ctx.error_message,
        }
    }

    async fn run_loop(
        &self,
        client: &dyn LlmClient,
        tools: &ToolServer,
        descriptors: &[crate::client::ToolDescriptor],
        system_prompt: &str,
        messages: &mut Vec<ChatMessage>,
        ctx: &mut AgentContext,
        config: &AgentConfig,
    ) -> VsResult<String> {
        let context_window = client.context_window(&config.model);
        let mut last_content = String::new();

        loop {
            if ctx.turn >= config.max_turns || ctx.is_cancelled() {
                break;
            }
            if ctx.total_input_tokens >= config.max_context_tokens {
                break;
            }

            if ctx.turn == config.max_turns - 1 {
                if let Some(urgency) = self.urgency_message(ctx.turn, config.max_turns) {
                    messages.push(ChatMessage::user(urgency));
                }
            }

            ctx.turn += 1;

            let request = CompletionRequest {
                model: &config.model,
                system_prompt,
                messages,
                tools: descriptors,
                max_tokens: 4_096,
                temperature: config.temperature,
            };
            let response = client.generate(request).await?;
            let cost = client.estimate_cost_usd(&config.model, &response.usage);
            ctx.add_usage(&response.usage, cost);

            if response.tool_calls.is_empty() {
                return Ok(response.content);
            }
            if self.should_stop(&response.content) {
                return Ok(response.content);
            }

            last_content = response.content.clone();
            messages.push(ChatMessage::assistant(response.content.clone(), response.tool_calls.clone()));

            for (seq, call) in response.tool_calls.iter().enumerate() {
                let started = std::time::Instant::now();
                let result = tools.call(&call.name, &call.arguments).await;
                let (is_error, output) = match result {
                    Ok(text) => (false, text),
                    Err(e) => (true, format!("error: {e}")),
                };
                let max_chars = (config.max_tool_output_tokens * 4) as usize;
                let truncated: String = output.chars().take(max_chars).collect();

                ctx.record_tool_call(ToolCallRecord {
                    turn: ctx.turn,
                    sequence: seq as i32,
                    name: call.name.clone(),
                    input: call.arguments.clone(),
                    output_size: output.len(),
                    duration_ms: started.elapsed().as_millis() as i64,
                    is_error,
                });

                messages.push(ChatMessage::tool_result(call.id.clone(), truncated));
            }

            let should_compress = config.enable_compression
                && (ctx.turn % 5 == 0 || ctx.total_input_tokens > (context_window * 8) / 10);
            if should_compress {
                match compress_messages(client, &config.model, messages, &self.compression_criteria()).await {
                    Ok(compressed) => *messages = compressed,
                    Err(e) => {
                        tracing::warn!(error = %e, "message compression failed, continuing uncompressed");
                    }
                }
            }
        }

        // Loop ended on turn/context/cancellation rather than a final
        // answer (spec.md §4.1 step 5's guards) - step 6 still runs
        // `parse_result` against the last assistant content rather than
        // discarding it, so a model that only produced its JSON on its
        // last turn before hitting the cap is still scored instead of
        // unconditionally retried next tick.
        Ok(last_content)
    }
}
