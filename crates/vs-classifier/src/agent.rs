//! `EventClassifierAgent` - the LLM stage of the Event Classifier (spec.md
//! §4.4), grounded on `research::analysis::relevance::RelevanceAnalyzer`'s
//! AI-scored classification shape, generalized to `vs_agent::BaseAgent`'s
//! tool-use loop.

use std::sync::Arc;

use async_trait::async_trait;
use vs_agent::base_agent::{AgentConfig, BaseAgent};
use vs_agent::json_extract::extract_json_value;
use vs_agent::tools::{github_tools, ToolServer};
use vs_core::VsResult;
use vs_github::GitHubClient;

const SYSTEM_PROMPT: &str = r#"You classify a single commit/PR/issue event from an open-source repository
into exactly one of five labels: security_bugfix, normal_bugfix, refactor, feature, other.

security_bugfix: the change fixes a vulnerability an attacker could exploit (memory safety,
injection, auth bypass, information disclosure, DoS, etc.), whether or not the maintainers
used the word "security".
normal_bugfix: fixes incorrect behavior with no security implication.
refactor: restructures or cleans up code without changing behavior.
feature: adds new functionality.
other: anything else (docs, tests, chores, releases, dependency bumps).

Use the provided tools to inspect the diff, the referenced issue, or the file content before
deciding - do not guess from the title alone when the message is ambiguous. Diffstat-first:
call a diff tool without file_path to see which files changed before drilling into one.

When you have enough information, respond with ONLY a JSON object of the form:
{"label": "<one of the five labels>", "confidence": <0.0-1.0>, "reasoning": "<one sentence>"}
"#;

pub struct EventClassifierAgent {
    pub github: Arc<GitHubClient>,
    pub owner: String,
    pub repo: String,
    pub event_title: String,
    pub event_message: Option<String>,
    pub event_ref: String,
    pub model: String,
}

impl EventClassifierAgent {
    #[must_use]
    pub fn config_for(model: String) -> AgentConfig {
        let mut config = AgentConfig::new("event_classifier", "classifier");
        config.max_turns = 5;
        config.temperature = 0.2;
        config.enable_compression = false;
        config.model = model;
        config
    }
}

#[async_trait]
impl BaseAgent for EventClassifierAgent {
    fn config(&self) -> AgentConfig {
        Self::config_for(self.model.clone())
    }

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn initial_message(&self, _target_id: uuid::Uuid) -> String {
        format!(
            "Event ref: {}\nTitle: {}\nMessage:\n{}",
            self.event_ref,
            self.event_title,
            self.event_message.as_deref().unwrap_or("(none)")
        )
    }

    fn build_tools(&self) -> ToolServer {
        github_tools(self.github.clone(), &self.owner, &self.repo)
    }

    fn should_stop(&self, content: &str) -> bool {
        extract_json_value(content).is_ok()
    }

    fn parse_result(&self, content: &str) -> VsResult<serde_json::Value> {
        extract_json_value(content)
    }
}
