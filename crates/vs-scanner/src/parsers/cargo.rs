//! `Cargo.toml` parser (spec.md §4.2), including git dependencies.

use toml::Value;
use vs_core::{VsError, VsResult};

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct CargoTomlParser;

const PATTERNS: &[&str] = &["**/Cargo.toml"];
const SECTIONS: &[&str] = &["dependencies", "dev-dependencies", "build-dependencies"];

impl ManifestParser for CargoTomlParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "cargo-toml"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let doc: Value = content
            .parse()
            .map_err(|e| VsError::ParseSchema(format!("invalid Cargo.toml: {e}")))?;

        let mut deps = Vec::new();
        for section in SECTIONS {
            let Some(table) = doc.get(section).and_then(Value::as_table) else {
                continue;
            };
            for (name, value) in table {
                deps.push(from_entry(name, value, file_path, self.detection_method()));
            }
        }
        Ok(deps)
    }
}

fn from_entry(name: &str, value: &Value, file_path: &str, method: &'static str) -> ScannedDependency {
    if let Some(table) = value.as_table() {
        if let Some(git) = table.get("git").and_then(Value::as_str) {
            let constraint = table
                .get("tag")
                .or_else(|| table.get("branch"))
                .or_else(|| table.get("rev"))
                .and_then(Value::as_str)
                .map(str::to_string);
            return ScannedDependency {
                library_name: name.to_string(),
                library_repo_url: Some(git.to_string()),
                constraint_expr: constraint,
                resolved_version: None,
                source_file: file_path.to_string(),
                detection_method: method,
            };
        }
        let version = table.get("version").and_then(Value::as_str).map(str::to_string);
        return ScannedDependency {
            library_name: name.to_string(),
            library_repo_url: None,
            constraint_expr: version,
            resolved_version: None,
            source_file: file_path.to_string(),
            detection_method: method,
        };
    }

    ScannedDependency {
        library_name: name.to_string(),
        library_repo_url: None,
        constraint_expr: value.as_str().map(str::to_string),
        resolved_version: None,
        source_file: file_path.to_string(),
        detection_method: method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_registry_and_git_dependencies() {
        let content = r#"
[dependencies]
serde = "1.0"
tokio = { version = "1.40", features = ["full"] }
my-fork = { git = "https://github.com/org/my-fork", branch = "main" }
"#;
        let parser = CargoTomlParser;
        let deps = parser.parse("Cargo.toml", content).unwrap();
        assert_eq!(deps.len(), 3);
        let git_dep = deps.iter().find(|d| d.library_name == "my-fork").unwrap();
        assert_eq!(git_dep.library_repo_url.as_deref(), Some("https://github.com/org/my-fork"));
        assert_eq!(git_dep.constraint_expr.as_deref(), Some("main"));
    }
}
