//! Foundry/Soldeer `foundry.toml` `[dependencies]` table parser (spec.md
//! §4.2). Library submodules checked out under `lib/` are covered by the
//! `.gitmodules` parser instead; this one only sees Soldeer-managed
//! dependencies, declared as `name = "version"` or `name = { version = "..",
//! url = ".." }`.

use toml::Value;
use vs_core::{VsError, VsResult};

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct FoundrySoldeerParser;

const PATTERNS: &[&str] = &["**/foundry.toml"];

impl ManifestParser for FoundrySoldeerParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "foundry-soldeer"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let doc: Value =
            toml::from_str(content).map_err(|e| VsError::ParseSchema(format!("invalid foundry.toml: {e}")))?;

        let Some(table) = doc.get("dependencies").and_then(Value::as_table) else {
            return Ok(Vec::new());
        };

        let mut deps = Vec::new();
        for (name, value) in table {
            let (version, url) = match value {
                Value::String(s) => (Some(s.clone()), None),
                Value::Table(t) => (
                    t.get("version").and_then(Value::as_str).map(str::to_string),
                    t.get("url").and_then(Value::as_str).map(str::to_string),
                ),
                _ => (None, None),
            };
            deps.push(ScannedDependency {
                library_name: name.clone(),
                library_repo_url: url,
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
    fn parses_string_and_table_dependency_entries() {
        let content = r#"
[profile.default]
src = "src"

[dependencies]
forge-std = "1.9.1"
solmate = { version = "6.7.0", url = "https://github.com/transmissions11/solmate" }
"#;
        let parser = FoundrySoldeerParser;
        let deps = parser.parse("foundry.toml", content).unwrap();
        assert_eq!(deps.len(), 2);
        let solmate = deps.iter().find(|d| d.library_name == "solmate").unwrap();
        assert_eq!(solmate.resolved_version.as_deref(), Some("6.7.0"));
        assert_eq!(solmate.library_repo_url.as_deref(), Some("https://github.com/transmissions11/solmate"));
    }
}
