use async_trait::async_trait;
use vs_core::VsResult;

use crate::client::{CompletionRequest, CompletionResponse, LlmClient, TokenUsage};

const BASE_URL: &str = "https://api.x.ai/v1";

pub struct XaiClient {
    http: reqwest::Client,
    api_key: String,
}

impl XaiClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl LlmClient for XaiClient {
    fn name(&self) -> &'static str {
        "xai"
    }

    fn supports_model(&self, model: &str) -> bool {
        model.starts_with("grok")
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> VsResult<CompletionResponse> {
        super::openai_compatible::generate(&self.http, BASE_URL, &self.api_key, request).await
    }

    fn context_window(&self, _model: &str) -> u32 {
        131_072
    }

    fn estimate_cost_usd(&self, _model: &str, usage: &TokenUsage) -> f64 {
        f64::from(usage.input_tokens) / 1_000_000.0 * 5.00
            + f64::from(usage.output_tokens) / 1_000_000.0 * 15.00
    }
}
