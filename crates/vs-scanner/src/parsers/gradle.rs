//! Gradle build-file parser (spec.md §4.2), covering both the Groovy
//! (`build.gradle`) and Kotlin (`build.gradle.kts`) DSLs. Handles the
//! common `configuration 'group:artifact:version'` / `configuration(
//! "group:artifact:version")` shorthand; the verbose `group:`/`name:`/
//! `version:` map form is a known gap, same tier as the other best-effort
//! parsers here.

use regex::Regex;
use vs_core::VsResult;

use crate::dependency::ScannedDependency;
use crate::parser::ManifestParser;

pub struct GradleParser;

const PATTERNS: &[&str] = &["**/build.gradle", "**/build.gradle.kts"];
const CONFIGURATIONS: &[&str] = &[
    "implementation",
    "api",
    "compile",
    "testImplementation",
    "runtimeOnly",
    "compileOnly",
];

impl ManifestParser for GradleParser {
    fn file_patterns(&self) -> &[&'static str] {
        PATTERNS
    }

    fn detection_method(&self) -> &'static str {
        "gradle-build"
    }

    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>> {
        let coordinate_re = Regex::new(r#"['"]([\w.\-]+):([\w.\-]+):([\w.\-]+)['"]"#).expect("valid regex");

        let mut deps = Vec::new();
        for line in content.lines() {
            let trimmed = line.trim();
            if !CONFIGURATIONS.iter().any(|c| trimmed.starts_with(c)) {
                continue;
            }
            if let Some(caps) = coordinate_re.captures(trimmed) {
                let group = &caps[1];
                let artifact = &caps[2];
                let version = caps[3].to_string();
                deps.push(ScannedDependency {
                    library_name: format!("{group}:{artifact}"),
                    library_repo_url: None,
                    constraint_expr: Some(version.clone()),
                    resolved_version: Some(version),
                    source_file: file_path.to_string(),
                    detection_method: self.detection_method(),
                });
            }
        }

        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_groovy_and_kotlin_shorthand() {
        let content = r#"
dependencies {
    implementation 'com.squareup.okhttp3:okhttp:4.12.0'
    api("org.jetbrains.kotlin:kotlin-stdlib:1.9.22")
    testImplementation "junit:junit:4.13.2"
}
"#;
        let parser = GradleParser;
        let deps = parser.parse("build.gradle.kts", content).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].library_name, "com.squareup.okhttp3:okhttp");
        assert_eq!(deps[1].resolved_version.as_deref(), Some("1.9.22"));
    }
}
