//! `pyproject.toml` parser (spec.md §4.2): PEP 621 `[project.dependencies]`
//! and Poetry's `[tool.poetry.dependencies]`.

use toml::Value;
use vs_core::{VsError, VsResult};

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct PyprojectTomlParser;

const PATTERNS: &[&str] = &["**/pyproject.toml"];

impl ManifestParser for PyprojectTomlParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "pyproject-toml"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let doc: Value = content
            .parse()
            .map_err(|e| VsError::ParseSchema(format!("invalid pyproject.toml: {e}")))?;

        let mut deps = Vec::new();

        if let Some(list) = doc.get("project").and_then(|p| p.get("dependencies")).and_then(Value::as_array) {
            for item in list {
                if let Some(spec) = item.as_str() {
                    deps.push(from_pep508(spec, file_path, self.detection_method()));
                }
            }
        }

        if let Some(table) = doc
            .get("tool")
            .and_then(|t| t.get("poetry"))
            .and_then(|p| p.get("dependencies"))
            .and_then(Value::as_table)
        {
            for (name, value) in table {
                if name == "python" {
                    continue;
                }
                deps.push(from_poetry_entry(name, value, file_path, self.detection_method()));
            }
        }

        Ok(deps)
    }
}

fn from_pep508(spec: &str, file_path: &str, method: &'static str) -> ScannedDependency {
    let (name_part, constraint) = split_constraint(spec);
    ScannedDependency {
        library_name: name_part.split('[').next().unwrap_or(name_part).trim().to_string(),
        library_repo_url: None,
        constraint_expr: constraint,
        resolved_version: None,
        source_file: file_path.to_string(),
        detection_method: method,
    }
}

fn from_poetry_entry(name: &str, value: &Value, file_path: &str, method: &'static str) -> ScannedDependency {
    if let Some(table) = value.as_table() {
        if let Some(git) = table.get("git").and_then(Value::as_str) {
            return ScannedDependency {
                library_name: name.to_string(),
                library_repo_url: Some(git.to_string()),
                constraint_expr: table.get("tag").and_then(Value::as_str).map(str::to_string),
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

    let constraint = value.as_str().map(str::to_string);
    ScannedDependency {
        library_name: name.to_string(),
        library_repo_url: None,
        constraint_expr: constraint,
        resolved_version: None,
        source_file: file_path.to_string(),
        detection_method: method,
    }
}

fn split_constraint(spec: &str) -> (&str, Option<String>) {
    for op in ["==", ">=", "<=", "!=", "~=", ">", "<"] {
        if let Some(idx) = spec.find(op) {
            return (&spec[..idx], Some(spec[idx..].trim().to_string()));
        }
    }
    (spec, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pep621_dependency_list() {
        let content = r#"
[project]
name = "demo"
dependencies = ["requests>=2.0", "flask==2.3.1"]
"#;
        let parser = PyprojectTomlParser;
        let deps = parser.parse("pyproject.toml", content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].library_name, "requests");
        assert_eq!(deps[1].constraint_expr.as_deref(), Some("==2.3.1"));
    }

    #[test]
    fn parses_poetry_git_dependency() {
        let content = r#"
[tool.poetry.dependencies]
python = "^3.11"
mylib = { git = "https://github.com/org/mylib.git", tag = "v1.0" }
"#;
        let parser = PyprojectTomlParser;
        let deps = parser.parse("pyproject.toml", content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].library_name, "mylib");
        assert_eq!(deps[0].library_repo_url.as_deref(), Some("https://github.com/org/mylib.git"));
    }
}
