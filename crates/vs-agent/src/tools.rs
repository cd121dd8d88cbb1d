//! MCP-style tool registration (spec.md §4.1 "Tool system").
//!
//! The teacher hand-rolls a JSON-RPC MCP server over stdio
//! (`tasks::mcp::server`) rather than a proc-macro. VulnSentinel follows the
//! same "hand-roll it" instinct but in-process: each engine run builds a
//! fresh `ToolServer` via `create_mcp_server()` so tool closures capture
//! per-run state (the GitHub client, `owner`/`repo`) without any shared
//! mutable state across concurrent agent runs.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use vs_core::{VsError, VsResult};
use vs_github::GitHubClient;

use crate::client::ToolDescriptor;

const MAX_PATCH_CHARS: usize = 15_000;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    async fn call(&self, input: &Value) -> VsResult<String>;
}

/// A fresh-per-run registry of tools. Construction is cheap; never shared
/// across concurrent `agent.run()` calls (spec.md §4.1 concurrency invariants).
#[derive(Default)]
pub struct ToolServer {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Tool descriptors in the OpenAI function-calling shape, with every
    /// `title` key recursively stripped (some model families reject it).
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: strip_title_keys(t.parameters_schema()),
            })
            .collect()
    }

    pub async fn call(&self, name: &str, input: &Value) -> VsResult<String> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| VsError::ParseSchema(format!("unknown tool '{name}'")))?;
        tool.call(input).await
    }
}

fn strip_title_keys(mut value: Value) -> Value {
    match &mut value {
        Value::Object(map) => {
            map.remove("title");
            for v in map.values_mut() {
                let stripped = strip_title_keys(std::mem::take(v));
                *v = stripped;
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                let stripped = strip_title_keys(std::mem::take(item));
                *item = stripped;
            }
        }
        _ => {}
    }
    value
}

fn string_param(input: &Value, key: &str, default: &str) -> String {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

struct FetchCommitDiff {
    client: Arc<GitHubClient>,
    owner: String,
    repo: String,
}

#[async_trait]
impl Tool for FetchCommitDiff {
    fn name(&self) -> &str {
        "fetch_commit_diff"
    }

    fn description(&self) -> &str {
        "Fetch the diffstat for a commit, or the full patch for one file within it. \
         Call without file_path first to see which files changed (diffstat-first)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "sha": { "type": "string", "description": "commit SHA" },
                "file_path": { "type": "string", "description": "optional: a single file's full patch" },
            },
            "required": ["sha"],
        })
    }

    async fn call(&self, input: &Value) -> VsResult<String> {
        let sha = input
            .get("sha")
            .and_then(Value::as_str)
            .ok_or_else(|| VsError::ParseSchema("fetch_commit_diff requires 'sha'".to_string()))?;
        let file_path = string_param(input, "file_path", "");

        if file_path.is_empty() {
            let stats = self.client.commit_diffstat(&self.owner, &self.repo, sha).await?;
            Ok(serde_json::to_string(&stats).unwrap_or_default())
        } else {
            let patch = self
                .client
                .commit_file_patch(&self.owner, &self.repo, sha, &file_path, MAX_PATCH_CHARS)
                .await?;
            Ok(patch.unwrap_or_else(|| format!("file '{file_path}' not found in commit {sha}")))
        }
    }
}

struct FetchPrDiff {
    client: Arc<GitHubClient>,
    owner: String,
    repo: String,
}

#[async_trait]
impl Tool for FetchPrDiff {
    fn name(&self) -> &str {
        "fetch_pr_diff"
    }

    fn description(&self) -> &str {
        "Fetch the diffstat for a pull request, or the full patch for one file within it. \
         Call without file_path first (diffstat-first)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pr_number": { "type": "integer", "description": "pull request number" },
                "file_path": { "type": "string", "description": "optional: a single file's full patch" },
            },
            "required": ["pr_number"],
        })
    }

    async fn call(&self, input: &Value) -> VsResult<String> {
        let pr_number = input
            .get("pr_number")
            .and_then(Value::as_u64)
            .ok_or_else(|| VsError::ParseSchema("fetch_pr_diff requires 'pr_number'".to_string()))?;
        let file_path = string_param(input, "file_path", "");

        if file_path.is_empty() {
            let stats = self.client.pr_diffstat(&self.owner, &self.repo, pr_number).await?;
            Ok(serde_json::to_string(&stats).unwrap_or_default())
        } else {
            let patch = self
                .client
                .pr_file_patch(&self.owner, &self.repo, pr_number, &file_path, MAX_PATCH_CHARS)
                .await?;
            Ok(patch.unwrap_or_else(|| format!("file '{file_path}' not found in PR #{pr_number}")))
        }
    }
}

struct FetchFileContent {
    client: Arc<GitHubClient>,
    owner: String,
    repo: String,
}

#[async_trait]
impl Tool for FetchFileContent {
    fn name(&self) -> &str {
        "fetch_file_content"
    }

    fn description(&self) -> &str {
        "Fetch the full contents of a file at a given ref (default HEAD)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
                "ref": { "type": "string", "description": "defaults to HEAD" },
            },
            "required": ["path"],
        })
    }

    async fn call(&self, input: &Value) -> VsResult<String> {
        let path = input
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| VsError::ParseSchema("fetch_file_content requires 'path'".to_string()))?;
        let git_ref = string_param(input, "ref", "HEAD");
        self.client.file_content(&self.owner, &self.repo, path, &git_ref).await
    }
}

struct FetchIssueBody {
    client: Arc<GitHubClient>,
    owner: String,
    repo: String,
}

#[async_trait]
impl Tool for FetchIssueBody {
    fn name(&self) -> &str {
        "fetch_issue_body"
    }

    fn description(&self) -> &str {
        "Fetch the body text of a GitHub issue."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "issue_number": { "type": "integer" } },
            "required": ["issue_number"],
        })
    }

    async fn call(&self, input: &Value) -> VsResult<String> {
        let issue_number = input
            .get("issue_number")
            .and_then(Value::as_u64)
            .ok_or_else(|| VsError::ParseSchema("fetch_issue_body requires 'issue_number'".to_string()))?;
        let body = self.client.issue_body(&self.owner, &self.repo, issue_number).await?;
        Ok(body.unwrap_or_else(|| "(no body)".to_string()))
    }
}

struct FetchPrBody {
    client: Arc<GitHubClient>,
    owner: String,
    repo: String,
}

#[async_trait]
impl Tool for FetchPrBody {
    fn name(&self) -> &str {
        "fetch_pr_body"
    }

    fn description(&self) -> &str {
        "Fetch the body text of a pull request."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "pr_number": { "type": "integer" } },
            "required": ["pr_number"],
        })
    }

    async fn call(&self, input: &Value) -> VsResult<String> {
        let pr_number = input
            .get("pr_number")
            .and_then(Value::as_u64)
            .ok_or_else(|| VsError::ParseSchema("fetch_pr_body requires 'pr_number'".to_string()))?;
        let body = self.client.pr_body(&self.owner, &self.repo, pr_number).await?;
        Ok(body.unwrap_or_else(|| "(no body)".to_string()))
    }
}

/// The five read-only repo tools shared by the Classifier and the Analyzer
/// (spec.md §4.4, §4.5), bound by closure to one GitHub client and repo
/// coordinates for the lifetime of a single agent run.
#[must_use]
pub fn github_tools(client: Arc<GitHubClient>, owner: &str, repo: &str) -> ToolServer {
    let mut server = ToolServer::new();
    server.register(Arc::new(FetchCommitDiff {
        client: client.clone(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    }));
    server.register(Arc::new(FetchPrDiff {
        client: client.clone(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    }));
    server.register(Arc::new(FetchFileContent {
        client: client.clone(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    }));
    server.register(Arc::new(FetchIssueBody {
        client: client.clone(),
        owner: owner.to_string(),
        repo: repo.to_string(),
    }));
    server.register(Arc::new(FetchPrBody {
        client,
        owner: owner.to_string(),
        repo: repo.to_string(),
    }));
    server
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_title_keys_recursively() {
        let schema = json!({
            "title": "Root",
            "type": "object",
            "properties": {
                "foo": { "title": "Foo", "type": "string" }
            }
        });
        let stripped = strip_title_keys(schema);
        assert!(stripped.get("title").is_none());
        assert!(stripped["properties"]["foo"].get("title").is_none());
        assert_eq!(stripped["properties"]["foo"]["type"], "string");
    }
}
