//! `owner/repo` extraction from a GitHub `repo_url`, shared by every engine
//! that talks to `vs_github::GitHubClient` (Scanner, Collector).

use crate::{VsError, VsResult};

/// Split a GitHub repo URL (`https://github.com/{owner}/{repo}` with or
/// without a trailing `.git`/`/`) into its `owner` and `repo` path
/// segments.
pub fn owner_repo(repo_url: &str) -> VsResult<(String, String)> {
    let trimmed = repo_url.trim_end_matches('/').trim_end_matches(".git");
    let path = trimmed
        .rsplit_once("github.com/")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);

    let mut parts = path.rsplit('/');
    let repo = parts.next();
    let owner = parts.next();

    match (owner, repo) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(VsError::Internal(anyhow::anyhow!(
            "not a recognizable github repo url: {repo_url}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_https_url_with_git_suffix() {
        let (owner, repo) = owner_repo("https://github.com/rust-lang/rust.git").unwrap();
        assert_eq!(owner, "rust-lang");
        assert_eq!(repo, "rust");
    }

    #[test]
    fn parses_https_url_without_suffix_or_trailing_slash() {
        let (owner, repo) = owner_repo("https://github.com/tokio-rs/tokio/").unwrap();
        assert_eq!(owner, "tokio-rs");
        assert_eq!(repo, "tokio");
    }

    #[test]
    fn rejects_non_github_url() {
        assert!(owner_repo("https://example.com/not-a-repo").is_err());
    }
}
