//! `requirements*.txt` parser (spec.md §4.2). A known gap: `setup.py` and
//! `Pipfile` aren't covered - users add those dependencies manually.

use vs_core::VsResult;

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct PipRequirementsParser;

const PATTERNS: &[&str] = &["**/requirements*.txt"];

impl ManifestParser for PipRequirementsParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "pip-requirements"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let mut deps = Vec::new();

        for raw_line in content.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() || line.starts_with('-') {
                continue;
            }

            if let Some(rest) = line.strip_prefix("git+") {
                // git+https://github.com/owner/repo.git@v1.0#egg=name
                let repo_url = rest.split('@').next().unwrap_or(rest).trim_end_matches(".git");
                let name = rest
                    .rsplit("egg=")
                    .next()
                    .unwrap_or("unknown")
                    .split(['&', '#'])
                    .next()
                    .unwrap_or("unknown")
                    .to_string();
                deps.push(ScannedDependency {
                    library_name: name,
                    library_repo_url: Some(repo_url.to_string()),
                    constraint_expr: None,
                    resolved_version: None,
                    source_file: file_path.to_string(),
                    detection_method: self.detection_method(),
                });
                continue;
            }

            let (name_part, constraint) = split_on_first_operator(line);
            let name = name_part.split('[').next().unwrap_or(name_part).trim();
            if name.is_empty() {
                continue;
            }

            deps.push(ScannedDependency {
                library_name: name.to_string(),
                library_repo_url: None,
                constraint_expr: constraint,
                resolved_version: exact_pin(line),
                source_file: file_path.to_string(),
                detection_method: self.detection_method(),
            });
        }

        Ok(deps)
    }
}

fn split_on_first_operator(line: &str) -> (&str, Option<String>) {
    for op in ["==", ">=", "<=", "!=", "~=", ">", "<"] {
        if let Some(idx) = line.find(op) {
            return (&line[..idx], Some(line[idx..].trim().to_string()));
        }
    }
    (line, None)
}

fn exact_pin(line: &str) -> Option<String> {
    line.split("==").nth(1).map(|v| v.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pinned_and_ranged_requirements() {
        let content = "requests==2.31.0\nflask>=2.0,<3.0\n# a comment\n-r other.txt\n";
        let parser = PipRequirementsParser;
        let deps = parser.parse("requirements.txt", content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].library_name, "requests");
        assert_eq!(deps[0].resolved_version.as_deref(), Some("2.31.0"));
        assert_eq!(deps[1].library_name, "flask");
        assert!(deps[1].resolved_version.is_none());
    }

    #[test]
    fn parses_git_urls() {
        let content = "git+https://github.com/psf/requests.git@v2.31.0#egg=requests\n";
        let parser = PipRequirementsParser;
        let deps = parser.parse("requirements.txt", content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].library_repo_url.as_deref(), Some("https://github.com/psf/requests"));
    }
}
