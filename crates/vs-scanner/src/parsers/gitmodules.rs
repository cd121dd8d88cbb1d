//! `.gitmodules` parser (spec.md §4.2). Each `[submodule "name"]` block's
//! `url =` line gives both the library name and its repo URL directly, with
//! no resolve step needed.

use regex::Regex;
use vs_core::VsResult;

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct GitmodulesParser;

const PATTERNS: &[&str] = &["**/.gitmodules"];

impl ManifestParser for GitmodulesParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "git-submodule"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let section_re = Regex::new(r#"(?m)^\[submodule\s+"([^"]+)"\]"#).expect("valid regex");
        let url_re = Regex::new(r"(?m)^\s*url\s*=\s*(.+)$").expect("valid regex");
        let path_re = Regex::new(r"(?m)^\s*path\s*=\s*(.+)$").expect("valid regex");

        let mut sections: Vec<(usize, &str)> =
            section_re.captures_iter(content).map(|c| (c.get(0).unwrap().start(), c.get(1).unwrap().as_str())).collect();
        sections.push((content.len(), ""));

        let mut deps = Vec::new();
        for window in sections.windows(2) {
            let (start, name) = window[0];
            let (end, _) = window[1];
            if name.is_empty() {
                continue;
            }
            let body = &content[start..end];
            let Some(url) = url_re.captures(body).map(|c| c[1].trim().to_string()) else {
                continue;
            };
            let path = path_re.captures(body).map(|c| c[1].trim().to_string());
            deps.push(ScannedDependency {
                library_name: path.unwrap_or_else(|| name.to_string()),
                library_repo_url: Some(url),
                constraint_expr: None,
                resolved_version: None,
                source_file: file_path.to_string(),
                detection_method: self.detection_method(),
            });
        }

        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_url_and_path_per_submodule() {
        let content = r#"
[submodule "vendor/fmt"]
	path = vendor/fmt
	url = https://github.com/fmtlib/fmt.git
[submodule "vendor/googletest"]
	path = vendor/googletest
	url = https://github.com/google/googletest.git
"#;
        let parser = GitmodulesParser;
        let deps = parser.parse(".gitmodules", content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].library_name, "vendor/fmt");
        assert_eq!(deps[0].library_repo_url.as_deref(), Some("https://github.com/fmtlib/fmt.git"));
        assert_eq!(deps[1].library_repo_url.as_deref(), Some("https://github.com/google/googletest.git"));
    }
}
