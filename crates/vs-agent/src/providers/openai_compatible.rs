//! Shared request/response mapping for the OpenAI chat-completions wire
//! format, reused by the OpenAI, DeepSeek, and xAI clients since all three
//! speak the same `/chat/completions` shape (spec.md §6 lists them as
//! distinct providers, but only Anthropic and Google diverge on the wire).

use serde_json::{json, Value};
use vs_core::{VsError, VsResult};

use crate::client::{ChatMessage, CompletionRequest, CompletionResponse, Role, StopReason, TokenUsage, ToolCall};

pub async fn generate(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    request: CompletionRequest<'_>,
) -> VsResult<CompletionResponse> {
    let messages = build_messages(request.system_prompt, request.messages);
    let tools = build_tools(request.tools);

    let mut body = json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    });
    if !tools.is_empty() {
        body["tools"] = Value::Array(tools);
    }

    let response = http
        .post(format!("{base_url}/chat/completions"))
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| VsError::Transient(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(VsError::Transient(format!("{base_url} returned {status}: {text}")));
    }

    let payload: Value = response
        .json()
        .await
        .map_err(|e| VsError::ParseSchema(e.to_string()))?;

    parse_response(&payload)
}

fn build_messages(system_prompt: &str, messages: &[ChatMessage]) -> Vec<Value> {
    let mut out = vec![json!({ "role": "system", "content": system_prompt })];
    for msg in messages {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        let mut entry = json!({ "role": role, "content": msg.content });
        if let Some(id) = &msg.tool_call_id {
            entry["tool_call_id"] = json!(id);
        }
        if !msg.tool_calls.is_empty() {
            entry["tool_calls"] = Value::Array(
                msg.tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": tc.arguments.to_string(),
                            }
                        })
                    })
                    .collect(),
            );
        }
        out.push(entry);
    }
    out
}

fn build_tools(tools: &[crate::client::ToolDescriptor]) -> Vec<Value> {
    tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                }
            })
        })
        .collect()
}

fn parse_response(payload: &Value) -> VsResult<CompletionResponse> {
    let choice = payload["choices"]
        .get(0)
        .ok_or_else(|| VsError::ParseSchema("response had no choices".to_string()))?;

    let message = &choice["message"];
    let content = message["content"].as_str().unwrap_or_default().to_string();

    let tool_calls = message["tool_calls"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|tc| {
            let id = tc["id"].as_str()?.to_string();
            let name = tc["function"]["name"].as_str()?.to_string();
            let arguments: Value = tc["function"]["arguments"]
                .as_str()
                .and_then(|s| serde_json::from_str(s).ok())
                .unwrap_or(Value::Null);
            Some(ToolCall { id, name, arguments })
        })
        .collect::<Vec<_>>();

    let finish_reason = choice["finish_reason"].as_str().unwrap_or("stop");
    let stop_reason = if !tool_calls.is_empty() || finish_reason == "tool_calls" {
        StopReason::ToolUse
    } else if finish_reason == "length" {
        StopReason::MaxTokens
    } else if finish_reason == "stop" {
        StopReason::EndTurn
    } else {
        StopReason::Other
    };

    let usage = TokenUsage {
        input_tokens: payload["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
        output_tokens: payload["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
    };

    Ok(CompletionResponse {
        content,
        tool_calls,
        stop_reason,
        usage,
    })
}
