//! `vcpkg.json` manifest parser (spec.md §4.2).

use serde::Deserialize;
use serde_json::Value;
use vs_core::{VsError, VsResult};

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct VcpkgJsonParser;

const PATTERNS: &[&str] = &["**/vcpkg.json"];

#[derive(Debug, Deserialize)]
struct VcpkgManifest {
    #[serde(default)]
    dependencies: Vec<Value>,
}

impl ManifestParser for VcpkgJsonParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "vcpkg-json"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let manifest: VcpkgManifest =
            serde_json::from_str(content).map_err(|e| VsError::ParseSchema(format!("invalid vcpkg.json: {e}")))?;

        let mut deps = Vec::new();
        for entry in manifest.dependencies {
            let (name, version) = match &entry {
                Value::String(s) => (s.clone(), None),
                Value::Object(obj) => {
                    let name = obj.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
                    let version = obj
                        .get("version>=")
                        .or_else(|| obj.get("version"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    (name, version)
                }
                _ => continue,
            };
            if name.is_empty() {
                continue;
            }
            deps.push(ScannedDependency {
                library_name: name,
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
    fn parses_string_and_object_dependency_entries() {
        let content = r#"
{
  "name": "demo",
  "version": "0.1.0",
  "dependencies": [
    "fmt",
    { "name": "openssl", "version>=": "3.2.1" }
  ]
}
"#;
        let parser = VcpkgJsonParser;
        let deps = parser.parse("vcpkg.json", content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].library_name, "fmt");
        assert_eq!(deps[1].library_name, "openssl");
        assert_eq!(deps[1].resolved_version.as_deref(), Some("3.2.1"));
    }
}
