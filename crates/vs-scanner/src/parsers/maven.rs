//! Maven `pom.xml` parser (spec.md §4.2), with `${property}` variable
//! substitution. No XML crate is in the dependency stack, so this is a
//! regex-based best-effort extraction of `<dependency>` blocks and
//! `<properties>` - the same tier of precision the spec accepts for the
//! CMake `find_package` parser.

use std::collections::HashMap;

use regex::Regex;
use vs_core::VsResult;

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct MavenPomParser;

const PATTERNS: &[&str] = &["**/pom.xml"];

impl ManifestParser for MavenPomParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "maven-pom"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let properties = extract_properties(content);
        let dependency_re = Regex::new(r"(?s)<dependency>(.*?)</dependency>").expect("valid regex");
        let group_re = Regex::new(r"<groupId>\s*([^<]+)\s*</groupId>").expect("valid regex");
        let artifact_re = Regex::new(r"<artifactId>\s*([^<]+)\s*</artifactId>").expect("valid regex");
        let version_re = Regex::new(r"<version>\s*([^<]+)\s*</version>").expect("valid regex");

        let mut deps = Vec::new();
        for block in dependency_re.captures_iter(content) {
            let body = &block[1];
            let Some(group_id) = group_re.captures(body).map(|c| c[1].trim().to_string()) else {
                continue;
            };
            let Some(artifact_id) = artifact_re.captures(body).map(|c| c[1].trim().to_string()) else {
                continue;
            };
            let version = version_re
                .captures(body)
                .map(|c| resolve_property(c[1].trim(), &properties));

            deps.push(ScannedDependency {
                library_name: format!("{group_id}:{artifact_id}"),
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

fn extract_properties(content: &str) -> HashMap<String, String> {
    let properties_re = Regex::new(r"(?s)<properties>(.*?)</properties>").expect("valid regex");
    let entry_re = Regex::new(r"<([A-Za-z0-9_.\-]+)>\s*([^<]+)\s*</\1>").expect("valid regex");

    let mut map = HashMap::new();
    if let Some(block) = properties_re.captures(content) {
        for entry in entry_re.captures_iter(&block[1]) {
            map.insert(entry[1].to_string(), entry[2].trim().to_string());
        }
    }
    map
}

fn resolve_property(raw: &str, properties: &HashMap<String, String>) -> String {
    if let Some(name) = raw.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        if let Some(value) = properties.get(name) {
            return value.clone();
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_dependencies_with_property_substitution() {
        let content = r#"
<project>
  <properties>
    <jackson.version>2.15.2</jackson.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>com.fasterxml.jackson.core</groupId>
      <artifactId>jackson-databind</artifactId>
      <version>${jackson.version}</version>
    </dependency>
    <dependency>
      <groupId>org.apache.commons</groupId>
      <artifactId>commons-lang3</artifactId>
      <version>3.14.0</version>
    </dependency>
  </dependencies>
</project>
"#;
        let parser = MavenPomParser;
        let deps = parser.parse("pom.xml", content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].library_name, "com.fasterxml.jackson.core:jackson-databind");
        assert_eq!(deps[0].resolved_version.as_deref(), Some("2.15.2"));
        assert_eq!(deps[1].resolved_version.as_deref(), Some("3.14.0"));
    }
}
