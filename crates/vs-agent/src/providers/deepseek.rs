use async_trait::async_trait;
use vs_core::VsResult;

use crate::client::{CompletionRequest, CompletionResponse, LlmClient, TokenUsage};

const BASE_URL: &str = "https://api.deepseek.com/v1";

/// DeepSeek speaks the OpenAI-compatible wire format; this is the default
/// compression model (spec.md §4.1's `deepseek/deepseek-chat` default).
pub struct DeepSeekClient {
    http: reqwest::Client,
    api_key: String,
}

impl DeepSeekClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl LlmClient for DeepSeekClient {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    fn supports_model(&self, model: &str) -> bool {
        model.starts_with("deepseek")
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> VsResult<CompletionResponse> {
        super::openai_compatible::generate(&self.http, BASE_URL, &self.api_key, request).await
    }

    fn context_window(&self, _model: &str) -> u32 {
        64_000
    }

    fn estimate_cost_usd(&self, _model: &str, usage: &TokenUsage) -> f64 {
        f64::from(usage.input_tokens) / 1_000_000.0 * 0.27
            + f64::from(usage.output_tokens) / 1_000_000.0 * 1.10
    }
}
