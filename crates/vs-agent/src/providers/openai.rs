use async_trait::async_trait;
use vs_core::VsResult;

use crate::client::{CompletionRequest, CompletionResponse, LlmClient, TokenUsage};

const BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn supports_model(&self, model: &str) -> bool {
        model.starts_with("gpt") || model.starts_with("o1") || model.starts_with("o3")
    }

    async fn generate(&self, request: CompletionRequest<'_>) -> VsResult<CompletionResponse> {
        super::openai_compatible::generate(&self.http, BASE_URL, &self.api_key, request).await
    }

    fn context_window(&self, model: &str) -> u32 {
        if model.starts_with("gpt-4o") || model.starts_with("o1") || model.starts_with("o3") {
            128_000
        } else {
            16_000
        }
    }

    fn estimate_cost_usd(&self, model: &str, usage: &TokenUsage) -> f64 {
        let (input_per_m, output_per_m) = if model.starts_with("gpt-4o") {
            (2.50, 10.00)
        } else if model.starts_with("o1") || model.starts_with("o3") {
            (15.00, 60.00)
        } else {
            (0.50, 1.50)
        };
        f64::from(usage.input_tokens) / 1_000_000.0 * input_per_m
            + f64::from(usage.output_tokens) / 1_000_000.0 * output_per_m
    }
}
