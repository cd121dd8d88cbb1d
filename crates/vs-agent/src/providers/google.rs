//! Google Gemini `generateContent` client - the one provider whose wire
//! format diverges from both Anthropic and the OpenAI-compatible trio.

use async_trait::async_trait;
use serde_json::{json, Value};
use vs_core::{VsError, VsResult};

use crate::client::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmClient, Role, StopReason, TokenUsage, ToolCall,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GoogleClient {
    http: reqwest::Client,
    api_key: String,
}

impl GoogleClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    fn build_contents(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = if m.role == Role::Assistant { "model" } else { "user" };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect()
    }

    fn build_tools(tools: &[crate::client::ToolDescriptor]) -> Vec<Value> {
        if tools.is_empty() {
            return Vec::new();
        }
        vec![json!({
            "functionDeclarations": tools.iter().map(|t| json!({
                "name": t.name,
                "description": t.description,
                "parameters": t.parameters,
            })).collect::<Vec<_>>()
        })]
    }
}

#[async_trait]
impl LlmClient for GoogleClient {
    fn name(&self) -> &'static str {
        "google"
    }

    fn supports_model(&self, model: &str) -> bool {
        model.starts_with("gemini")
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> VsResult<CompletionResponse> {
        let body = json!({
            "system_instruction": { "parts": [{ "text": request.system_prompt }] },
            "contents": Self::build_contents(request.messages),
            "tools": Self::build_tools(request.tools),
            "generationConfig": {
                "maxOutputTokens": request.max_tokens,
                "temperature": request.temperature,
            }
        });

        let url = format!("{BASE_URL}/{}:generateContent?key={}", request.model, self.api_key);

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VsError::Transient(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(VsError::Transient(format!("google returned {status}: {text}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| VsError::ParseSchema(e.to_string()))?;

        Self::parse_response(&payload)
    }

    fn context_window(&self, model: &str) -> u32 {
        if model.contains("1.5-pro") || model.contains("2.0") {
            1_000_000
        } else {
            32_000
        }
    }

    fn estimate_cost_usd(&self, _model: &str, usage: &TokenUsage) -> f64 {
        f64::from(usage.input_tokens) / 1_000_000.0 * 1.25
            + f64::from(usage.output_tokens) / 1_000_000.0 * 5.00
    }
}

impl GoogleClient {
    fn parse_response(payload: &Value) -> VsResult<CompletionResponse> {
        let candidate = payload["candidates"]
            .get(0)
            .ok_or_else(|| VsError::ParseSchema("response had no candidates".to_string()))?;

        let parts = candidate["content"]["parts"].as_array().cloned().unwrap_or_default();

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
            if let Some(call) = part.get("functionCall") {
                if let Some(name) = call["name"].as_str() {
                    tool_calls.push(ToolCall {
                        id: format!("call_{i}"),
                        name: name.to_string(),
                        arguments: call["args"].clone(),
                    });
                }
            }
        }

        let stop_reason = match candidate["finishReason"].as_str() {
            Some("STOP") if !tool_calls.is_empty() => StopReason::ToolUse,
            Some("STOP") => StopReason::EndTurn,
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            _ => StopReason::Other,
        };

        let usage = TokenUsage {
            input_tokens: payload["usageMetadata"]["promptTokenCount"].as_u64().unwrap_or(0) as u32,
            output_tokens: payload["usageMetadata"]["candidatesTokenCount"].as_u64().unwrap_or(0) as u32,
        };

        Ok(CompletionResponse {
            content: text,
            tool_calls,
            stop_reason,
            usage,
        })
    }
}
