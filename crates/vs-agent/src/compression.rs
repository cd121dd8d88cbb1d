//! Message-list compression (spec.md §4.1 step 5): triggered when the turn
//! counter is a multiple of five or accumulated input tokens exceed 80% of
//! the model context window. Keeps the first user message and the last four
//! messages; summarizes everything in between with a cheap model.

use vs_core::VsResult;

use crate::client::{ChatMessage, CompletionRequest, LlmClient, Role};

/// The cheap model used for mid-conversation summarization, independent of
/// whatever model the agent itself is using for its main turns.
const COMPRESSION_MODEL: &str = "deepseek/deepseek-chat";

/// Compress `messages` in place, preserving the first user message and the
/// last four messages verbatim. Returns the new, shorter message list.
pub async fn compress_messages(
    client: &dyn LlmClient,
    _agent_model: &str,
    messages: &[ChatMessage],
    criteria: &str,
) -> VsResult<Vec<ChatMessage>> {
    const TAIL_LEN: usize = 4;

    if messages.len() <= TAIL_LEN + 1 {
        // Nothing worth compressing - too few messages to have a "middle".
        return Ok(messages.to_vec());
    }

    let first = messages[0].clone();
    let tail_start = messages.len() - TAIL_LEN;
    let middle = &messages[1..tail_start];
    let tail = &messages[tail_start..];

    if middle.is_empty() {
        return Ok(messages.to_vec());
    }

    let transcript: String = middle
        .iter()
        .map(|m| format!("[{:?}] {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    let summary_prompt = format!(
        "{criteria}\n\nConversation excerpt to summarize:\n\n{transcript}"
    );

    let request = CompletionRequest {
        model: COMPRESSION_MODEL,
        system_prompt: "You compress agent conversation history. Reply with the summary only.",
        messages: &[ChatMessage::user(summary_prompt)],
        tools: &[],
        max_tokens: 1_024,
        temperature: 0.0,
    };

    let response = client.generate(request).await?;

    let mut compressed = Vec::with_capacity(2 + tail.len());
    compressed.push(first);
    compressed.push(ChatMessage {
        role: Role::Assistant,
        content: format!("[earlier turns summarized]\n{}", response.content),
        tool_calls: Vec::new(),
        tool_call_id: None,
    });
    compressed.extend_from_slice(tail);

    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{CompletionResponse, StopReason, TokenUsage};
    use async_trait::async_trait;

    struct StubClient;

    #[async_trait]
    impl LlmClient for StubClient {
        fn name(&self) -> &'static str {
            "stub"
        }
        fn supports_model(&self, _model: &str) -> bool {
            true
        }
        async fn generate(&self, _request: CompletionRequest<'_>) -> VsResult<CompletionResponse> {
            Ok(CompletionResponse {
                content: "summary text".to_string(),
                tool_calls: Vec::new(),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }
        fn context_window(&self, _model: &str) -> u32 {
            16_000
        }
        fn estimate_cost_usd(&self, _model: &str, _usage: &TokenUsage) -> f64 {
            0.0
        }
    }

    #[tokio::test]
    async fn keeps_first_message_and_last_four_verbatim() {
        let client = StubClient;
        let messages: Vec<ChatMessage> = (0..10)
            .map(|i| ChatMessage::user(format!("turn {i}")))
            .collect();

        let compressed = compress_messages(&client, "any-model", &messages, "summarize")
            .await
            .unwrap();

        assert_eq!(compressed.first().unwrap().content, "turn 0");
        assert_eq!(compressed.len(), 2 + 4);
        assert_eq!(compressed[1].content, "[earlier turns summarized]\nsummary text");
        assert_eq!(compressed[2].content, "turn 6");
        assert_eq!(compressed.last().unwrap().content, "turn 9");
    }

    #[tokio::test]
    async fn leaves_short_conversations_untouched() {
        let client = StubClient;
        let messages = vec![ChatMessage::user("a"), ChatMessage::user("b")];
        let compressed = compress_messages(&client, "any-model", &messages, "summarize")
            .await
            .unwrap();
        assert_eq!(compressed.len(), 2);
    }
}
