//! `go.mod` parser (spec.md §4.2). Go module paths that start with a known
//! forge host resolve directly to a repo URL; anything else is left
//! unresolved (`library_repo_url = None`).

use vs_core::VsResult;

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct GoModParser;

const PATTERNS: &[&str] = &["**/go.mod"];

impl ManifestParser for GoModParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "go-mod"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let mut deps = Vec::new();
        let mut in_require_block = false;

        for raw_line in content.lines() {
            let line = raw_line.split("//").next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with("require (") {
                in_require_block = true;
                continue;
            }
            if in_require_block && line == ")" {
                in_require_block = false;
                continue;
            }

            let entry = if in_require_block {
                Some(line)
            } else {
                line.strip_prefix("require ")
            };

            let Some(entry) = entry else { continue };
            let mut parts = entry.split_whitespace();
            let Some(module_path) = parts.next() else { continue };
            let Some(version) = parts.next() else { continue };
            if module_path.is_empty() {
                continue;
            }

            deps.push(ScannedDependency {
                library_name: module_path.to_string(),
                library_repo_url: repo_url_from_module_path(module_path),
                constraint_expr: Some(version.to_string()),
                resolved_version: Some(version.to_string()),
                source_file: file_path.to_string(),
                detection_method: self.detection_method(),
            });
        }

        Ok(deps)
    }
}

fn repo_url_from_module_path(module_path: &str) -> Option<String> {
    let mut segments = module_path.splitn(2, '/');
    let host = segments.next()?;
    let rest = segments.next()?;

    match host {
        "github.com" => {
            let mut parts = rest.splitn(3, '/');
            let owner = parts.next()?;
            let repo = parts.next()?;
            Some(format!("https://github.com/{owner}/{repo}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_require_block_and_single_line_require() {
        let content = r#"
module example.com/app

go 1.21

require (
	github.com/spf13/cobra v1.8.0
	golang.org/x/sync v0.6.0
)

require github.com/pkg/errors v0.9.1
"#;
        let parser = GoModParser;
        let deps = parser.parse("go.mod", content).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].library_name, "github.com/spf13/cobra");
        assert_eq!(deps[0].library_repo_url.as_deref(), Some("https://github.com/spf13/cobra"));
        assert!(deps[1].library_repo_url.is_none());
        assert_eq!(deps[2].resolved_version.as_deref(), Some("v0.9.1"));
    }
}
