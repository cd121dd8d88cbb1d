//! `ReachabilityBackend` - the boundary to the external static-analysis
//! collaborator (spec.md §4.7). This runner never touches the graph
//! database itself; it makes one call per `ClientVuln` and interprets the
//! result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vs_core::VsResult;

/// What the analyzer knows about the fix commit, passed through verbatim so
/// the collaborator can resolve target functions itself when
/// `affected_functions` is absent.
#[derive(Debug, Clone, Serialize)]
pub struct VulnDescriptor {
    pub vuln_type: String,
    pub summary: String,
    pub commit_sha: String,
    pub affected_functions: Option<Vec<String>>,
}

/// The collaborator's verdict for one `(repo_url, version)` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct ReachabilityVerdict {
    pub is_reachable: bool,
    #[serde(default)]
    pub paths: serde_json::Value,
}

/// A collaborator-side condition that should not advance the pipeline -
/// the record stays `pending` for a later retry (spec.md §4.7).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReachabilityError {
    #[error("snapshot not ready: {0}")]
    SnapshotNotReady(String),
    #[error("cannot determine target functions: {0}")]
    TargetFunctionsUnresolved(String),
    #[error("collaborator call failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait ReachabilityBackend: Send + Sync {
    async fn check_reachability(
        &self,
        repo_url: &str,
        version: &str,
        vuln: &VulnDescriptor,
    ) -> VsResult<Result<ReachabilityVerdict, ReachabilityError>>;
}

pub struct HttpReachabilityBackend {
    base_url: String,
    client: reqwest::Client,
}

const ENV_REACHABILITY_BASE_URL: &str = "REACHABILITY_SERVICE_URL";

impl HttpReachabilityBackend {
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var(ENV_REACHABILITY_BASE_URL)
            .unwrap_or_else(|_| "http://localhost:8088".to_string());
        Self { base_url, client: reqwest::Client::new() }
    }

    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self { base_url, client: reqwest::Client::new() }
    }
}

#[derive(Debug, Serialize)]
struct ReachabilityRequest<'a> {
    repo_url: &'a str,
    version: &'a str,
    #[serde(flatten)]
    vuln: &'a VulnDescriptor,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum ReachabilityResponse {
    Reachable { paths: serde_json::Value },
    NotReachable,
    SnapshotNotReady { detail: String },
    TargetFunctionsUnresolved { detail: String },
}

#[async_trait]
impl ReachabilityBackend for HttpReachabilityBackend {
    async fn check_reachability(
        &self,
        repo_url: &str,
        version: &str,
        vuln: &VulnDescriptor,
    ) -> VsResult<Result<ReachabilityVerdict, ReachabilityError>> {
        let request = ReachabilityRequest { repo_url, version, vuln };

        let response = self
            .client
            .post(format!("{}/check", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| ReachabilityError::Transport(err.to_string()));

        let response = match response {
            Ok(response) => response,
            Err(err) => return Ok(Err(err)),
        };

        let body: ReachabilityResponse = match response.error_for_status() {
            Ok(response) => match response.json().await {
                Ok(body) => body,
                Err(err) => return Ok(Err(ReachabilityError::Transport(err.to_string()))),
            },
            Err(err) => return Ok(Err(ReachabilityError::Transport(err.to_string()))),
        };

        Ok(match body {
            ReachabilityResponse::Reachable { paths } => {
                Ok(ReachabilityVerdict { is_reachable: true, paths })
            }
            ReachabilityResponse::NotReachable => {
                Ok(ReachabilityVerdict { is_reachable: false, paths: serde_json::Value::Null })
            }
            ReachabilityResponse::SnapshotNotReady { detail } => {
                Err(ReachabilityError::SnapshotNotReady(detail))
            }
            ReachabilityResponse::TargetFunctionsUnresolved { detail } => {
                Err(ReachabilityError::TargetFunctionsUnresolved(detail))
            }
        })
    }
}
