//! Anthropic Messages API client, grounded on the teacher's
//! `tasks::ai::anthropic` provider generalized from its single-shot
//! `generate_text` call to the tool-use-capable shape `BaseAgent` needs.

use async_trait::async_trait;
use serde_json::{json, Value};
use vs_core::{VsError, VsResult};

use crate::client::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmClient, Role, StopReason, TokenUsage, ToolCall,
};

const BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    fn build_messages(messages: &[ChatMessage]) -> Vec<Value> {
        let mut out = Vec::with_capacity(messages.len());
        for msg in messages {
            match msg.role {
                Role::System => continue, // passed separately as `system`
                Role::User => out.push(json!({ "role": "user", "content": msg.content })),
                Role::Assistant => {
                    let mut content = Vec::new();
                    if !msg.content.is_empty() {
                        content.push(json!({ "type": "text", "text": msg.content }));
                    }
                    for tc in &msg.tool_calls {
                        content.push(json!({
                            "type": "tool_use",
                            "id": tc.id,
                            "name": tc.name,
                            "input": tc.arguments,
                        }));
                    }
                    out.push(json!({ "role": "assistant", "content": content }));
                }
                Role::Tool => {
                    out.push(json!({
                        "role": "user",
                        "content": [{
                            "type": "tool_result",
                            "tool_use_id": msg.tool_call_id,
                            "content": msg.content,
                        }]
                    }));
                }
            }
        }
        out
    }

    fn build_tools(tools: &[crate::client::ToolDescriptor]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "input_schema": t.parameters,
                })
            })
            .collect()
    }

    fn parse_response(payload: &Value) -> VsResult<CompletionResponse> {
        let blocks = payload["content"]
            .as_array()
            .ok_or_else(|| VsError::ParseSchema("response had no content blocks".to_string()))?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for block in blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(t) = block["text"].as_str() {
                        text.push_str(t);
                    }
                }
                Some("tool_use") => {
                    if let (Some(id), Some(name)) = (block["id"].as_str(), block["name"].as_str()) {
                        tool_calls.push(ToolCall {
                            id: id.to_string(),
                            name: name.to_string(),
                            arguments: block["input"].clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        let stop_reason = match payload["stop_reason"].as_str() {
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            Some("end_turn") | Some("stop_sequence") => StopReason::EndTurn,
            _ => StopReason::Other,
        };

        let usage = TokenUsage {
            input_tokens: payload["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: payload["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(CompletionResponse {
            content: text,
            tool_calls,
            stop_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn supports_model(&self, model: &str) -> bool {
        model.starts_with("claude")
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> VsResult<CompletionResponse> {
        let mut body = json!({
            "model": request.model,
            "system": request.system_prompt,
            "messages": Self::build_messages(request.messages),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });
        let tools = Self::build_tools(request.tools);
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools);
        }

        let response = self
            .http
            .post(BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| VsError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(VsError::Transient(format!("anthropic returned {status}: {text}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| VsError::ParseSchema(e.to_string()))?;

        Self::parse_response(&payload)
    }

    fn context_window(&self, _model: &str) -> u32 {
        200_000
    }

    fn estimate_cost_usd(&self, model: &str, usage: &TokenUsage) -> f64 {
        let (input_per_m, output_per_m) = if model.contains("haiku") {
            (0.80, 4.00)
        } else if model.contains("opus") {
            (15.00, 75.00)
        } else {
            (3.00, 15.00) // sonnet tier
        };
        f64::from(usage.input_tokens) / 1_000_000.0 * input_per_m
            + f64::from(usage.output_tokens) / 1_000_000.0 * output_per_m
    }
}
