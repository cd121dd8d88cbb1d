//! `VulnAnalyzerAgent` - the LLM stage of the Vuln Analyzer (spec.md §4.5),
//! sharing the five read-only GitHub tools with the classifier via the same
//! MCP factory.

use std::sync::Arc;

use async_trait::async_trait;
use vs_agent::base_agent::{AgentConfig, BaseAgent};
use vs_agent::json_extract::extract_json_array;
use vs_agent::tools::{github_tools, ToolServer};
use vs_core::VsResult;
use vs_github::GitHubClient;

const SYSTEM_PROMPT: &str = r#"You analyze a single commit/PR that has already been classified as a security
bugfix in an open-source repository, and extract every distinct vulnerability it fixes.

Strategy: call a diffstat tool first (no file_path) to see which files changed, then fetch the
security-relevant files (not every changed file). If the event references an issue or PR, fetch
its body for context on impact and affected versions. Check test files for a reproduction case.

vuln_type is free text describing the vulnerability class (e.g. "buffer overflow", "SQL injection",
"use-after-free", "auth bypass") - use whatever term fits best, CWE naming is not required.

severity is one of: low, medium, high, critical.

affected_versions is free text describing the version range fixed by this change (e.g. "< 2.3.1",
"all versions prior to this commit"). If you cannot determine a range, describe what you do know.

Maintainers sometimes bundle multiple unrelated security fixes into one commit - when that happens,
emit one result per distinct vulnerability.

Respond with ONLY a JSON array of objects, each shaped as:
{"vuln_type": "...", "severity": "low|medium|high|critical", "affected_versions": "...",
 "summary": "<one paragraph>", "reasoning": "<why this is exploitable>",
 "upstream_poc": <object or null>, "affected_functions": ["..."] or null}

Example (single vulnerability):
[{"vuln_type": "integer overflow", "severity": "high", "affected_versions": "< 1.4.2",
  "summary": "An attacker-controlled length field could overflow during buffer allocation.",
  "reasoning": "The size computation lacked a checked_mul, letting a crafted input wrap to a small allocation.",
  "upstream_poc": null, "affected_functions": ["alloc_buffer"]}]

If there is exactly one vulnerability, still return an array with one element.
"#;

pub struct VulnAnalyzerAgent {
    pub github: Arc<GitHubClient>,
    pub owner: String,
    pub repo: String,
    pub event_title: String,
    pub event_message: Option<String>,
    pub event_ref: String,
    pub related_issue_ref: Option<String>,
}

impl VulnAnalyzerAgent {
    #[must_use]
    pub fn config() -> AgentConfig {
        let mut config = AgentConfig::new("vuln_analyzer", "analyzer");
        config.max_turns = 15;
        config.temperature = 0.2;
        config.enable_compression = true;
        config
    }
}

#[async_trait]
impl BaseAgent for VulnAnalyzerAgent {
    fn config(&self) -> AgentConfig {
        Self::config()
    }

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn initial_message(&self, _target_id: uuid::Uuid) -> String {
        format!(
            "Commit/PR ref: {}\nTitle: {}\nRelated issue/PR: {}\nMessage:\n{}",
            self.event_ref,
            self.event_title,
            self.related_issue_ref.as_deref().unwrap_or("(none)"),
            self.event_message.as_deref().unwrap_or("(none)")
        )
    }

    fn build_tools(&self) -> ToolServer {
        github_tools(self.github.clone(), &self.owner, &self.repo)
    }

    fn should_stop(&self, content: &str) -> bool {
        extract_json_array(content).is_ok()
    }

    fn parse_result(&self, content: &str) -> VsResult<serde_json::Value> {
        Ok(serde_json::Value::Array(extract_json_array(content)?))
    }
}
