//! Provider registry, grounded on `tasks::ai::registry::ProviderRegistry` -
//! same "resolve by model id" shape, generalized from two hardcoded
//! providers to the five spec.md §6 names, resolved by prefix rather than
//! `supported_models()` membership (model catalogs change too often to hardcode).

use std::collections::HashMap;
use std::sync::Arc;

use vs_core::config::api_key_env_var_for_model;
use vs_core::{VsError, VsResult};

use crate::client::LlmClient;
use crate::providers::{AnthropicClient, DeepSeekClient, GoogleClient, OpenAiClient, XaiClient};

pub struct ProviderRegistry {
    providers: Vec<Arc<dyn LlmClient>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn LlmClient>>) -> Self {
        Self { providers }
    }

    /// Build a registry from whichever provider API keys are set in the
    /// process environment (spec.md §6).
    #[must_use]
    pub fn from_env() -> Self {
        let mut providers: Vec<Arc<dyn LlmClient>> = Vec::new();
        let keys: HashMap<&str, fn(String) -> Arc<dyn LlmClient>> = HashMap::from([
            ("ANTHROPIC_API_KEY", (|k| Arc::new(AnthropicClient::new(k)) as Arc<dyn LlmClient>) as fn(String) -> Arc<dyn LlmClient>),
            ("OPENAI_API_KEY", (|k| Arc::new(OpenAiClient::new(k)) as Arc<dyn LlmClient>) as fn(String) -> Arc<dyn LlmClient>),
            ("DEEPSEEK_API_KEY", (|k| Arc::new(DeepSeekClient::new(k)) as Arc<dyn LlmClient>) as fn(String) -> Arc<dyn LlmClient>),
            ("GEMINI_API_KEY", (|k| Arc::new(GoogleClient::new(k)) as Arc<dyn LlmClient>) as fn(String) -> Arc<dyn LlmClient>),
            ("XAI_API_KEY", (|k| Arc::new(XaiClient::new(k)) as Arc<dyn LlmClient>) as fn(String) -> Arc<dyn LlmClient>),
        ]);

        for (env_var, ctor) in keys {
            if let Ok(key) = std::env::var(env_var) {
                providers.push(ctor(key));
            }
        }

        Self { providers }
    }

    /// Resolve the client that should serve this model ID, by prefix
    /// (spec.md §4.1: "resolves API keys from named environment variables
    /// based on the model ID prefix").
    pub fn get_for_model(&self, model: &str) -> VsResult<Arc<dyn LlmClient>> {
        self.providers
            .iter()
            .find(|p| p.supports_model(model))
            .cloned()
            .ok_or_else(|| {
                let env_var = api_key_env_var_for_model(model);
                VsError::PreconditionMissing(format!(
                    "no provider configured for model '{model}' (expected {env_var} to be set)"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_reports_missing_precondition() {
        let registry = ProviderRegistry::new(Vec::new());
        let err = registry.get_for_model("claude-3-5-sonnet").unwrap_err();
        assert!(matches!(err, VsError::PreconditionMissing(_)));
    }

    #[test]
    fn resolves_to_the_provider_that_supports_the_model() {
        let registry = ProviderRegistry::new(vec![
            Arc::new(AnthropicClient::new("k".to_string())) as Arc<dyn LlmClient>,
            Arc::new(DeepSeekClient::new("k".to_string())) as Arc<dyn LlmClient>,
        ]);
        let client = registry.get_for_model("deepseek/deepseek-chat").unwrap();
        assert_eq!(client.name(), "deepseek");
    }
}
