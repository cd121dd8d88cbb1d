//! Conan `conanfile.txt` `[requires]` section parser (spec.md §4.2).
//! `conanfile.py` is a known gap - users add those dependencies manually.

use vs_core::VsResult;

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct ConanParser;

const PATTERNS: &[&str] = &["**/conanfile.txt"];

impl ManifestParser for ConanParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "conan"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let mut deps = Vec::new();
        let mut in_requires = false;

        for raw_line in content.lines() {
            let line = raw_line.trim();
            if line.starts_with('[') {
                in_requires = line == "[requires]";
                continue;
            }
            if !in_requires || line.is_empty() {
                continue;
            }

            // name/version@user/channel or name/version
            let spec = line.split('@').next().unwrap_or(line);
            let mut parts = spec.splitn(2, '/');
            let Some(name) = parts.next() else { continue };
            let version = parts.next().map(str::to_string);

            deps.push(ScannedDependency {
                library_name: name.to_string(),
                library_repo_url: None,
                constraint_expr: version.clone(),
                resolved_version: version,
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
    fn parses_requires_section_only() {
        let content = "[requires]\nzlib/1.3.1\nopenssl/3.2.1@\n\n[generators]\nCMakeDeps\n";
        let parser = ConanParser;
        let deps = parser.parse("conanfile.txt", content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].library_name, "zlib");
        assert_eq!(deps[0].resolved_version.as_deref(), Some("1.3.1"));
    }
}
