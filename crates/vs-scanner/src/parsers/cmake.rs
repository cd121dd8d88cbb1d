//! `CMakeLists.txt` `find_package(...)` scanner (spec.md §4.2). Best-effort,
//! ~70-80% precision: `find_package` names a CMake package, not a repo, so
//! `library_repo_url` is always `None` here - these rows surface for user
//! visibility but are never inserted (spec.md §4.2 step 6).

use regex::Regex;
use vs_core::VsResult;

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct CMakeFindPackageParser;

const PATTERNS: &[&str] = &["**/CMakeLists.txt"];

impl ManifestParser for CMakeFindPackageParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "cmake-find-package"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let re = Regex::new(r"(?i)find_package\s*\(\s*([A-Za-z0-9_\-]+)(?:\s+([0-9][0-9.]*))?")
            .expect("valid regex");

        let mut deps = Vec::new();
        for caps in re.captures_iter(content) {
            let name = caps[1].to_string();
            let version = caps.get(2).map(|m| m.as_str().to_string());
            deps.push(ScannedDependency {
                library_name: name,
                library_repo_url: None,
                constraint_expr: version,
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
    fn extracts_package_name_and_optional_version() {
        let content = "find_package(OpenSSL 3.2 REQUIRED)\nfind_package(ZLIB REQUIRED)\n";
        let parser = CMakeFindPackageParser;
        let deps = parser.parse("CMakeLists.txt", content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].library_name, "OpenSSL");
        assert_eq!(deps[0].constraint_expr.as_deref(), Some("3.2"));
        assert!(deps[0].library_repo_url.is_none());
        assert_eq!(deps[1].library_name, "ZLIB");
        assert!(deps[1].constraint_expr.is_none());
    }
}
