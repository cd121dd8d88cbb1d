//! `ManifestParser` trait + `ParserRegistry`, grounded on the teacher's
//! registry-of-trait-objects shape in `tasks::ai::registry::ProviderRegistry`
//! (spec.md §4.2 "Parser Registry").

use vs_core::VsResult;

use crate::dependency::ScannedDependency;

/// One manifest-format parser. Declares which file paths it claims via glob
/// patterns and extracts `ScannedDependency` rows from a matched file's
/// content.
pub trait ManifestParser: Send + Sync {
    /// Glob patterns this parser's files must match (e.g. `**/pom.xml`).
    fn file_patterns(&self) -> &[&'static str];

    /// Tag recorded as `detection_method` / `constraint_source` for rows
    /// this parser produces.
    fn detection_method(&self) -> &'static str;

    /// Parse one matched manifest file's content.
    fn parse(&self, file_path: &str, content: &str) -> VsResult<Vec<ScannedDependency>>;
}

/// Registry of every parser the core ships (spec.md §4.2: 11 formats).
pub struct ParserRegistry {
    parsers: Vec<Box<dyn ManifestParser>>,
}

impl ParserRegistry {
    #[must_use]
    pub fn new(parsers: Vec<Box<dyn ManifestParser>>) -> Self {
        Self { parsers }
    }

    /// The full set of built-in parsers (spec.md §4.2 "Parser Registry").
    #[must_use]
    pub fn with_builtins() -> Self {
        use crate::parsers::*;
        Self::new(vec![
            Box::new(pip::PipRequirementsParser),
            Box::new(pyproject::PyprojectTomlParser),
            Box::new(maven::MavenPomParser),
            Box::new(gradle::GradleParser),
            Box::new(gomod::GoModParser),
            Box::new(cargo::CargoTomlParser),
            Box::new(conan::ConanParser),
            Box::new(vcpkg::VcpkgJsonParser),
            Box::new(cmake::CMakeFindPackageParser),
            Box::new(gitmodules::GitmodulesParser),
            Box::new(foundry::FoundrySoldeerParser),
        ])
    }

    /// All glob patterns across every registered parser, for the tree walk.
    #[must_use]
    pub fn all_patterns(&self) -> Vec<&'static str> {
        self.parsers.iter().flat_map(|p| p.file_patterns()).copied().collect()
    }

    /// The parsers whose patterns match `path`, in registration order. A
    /// single file can in principle match more than one parser (not the
    /// case for the built-ins, but the registry doesn't assume otherwise).
    pub fn parsers_for(&self, path: &str) -> impl Iterator<Item = &dyn ManifestParser> {
        self.parsers
            .iter()
            .filter(move |p| p.file_patterns().iter().any(|pat| glob_match(pat, path)))
            .map(std::convert::AsRef::as_ref)
    }
}

/// Minimal glob matcher supporting `**/` prefix (any depth) and a single
/// `*` wildcard within the final path segment - the only two shapes the
/// built-in parsers' patterns use.
#[must_use]
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let pattern = pattern.strip_prefix("**/").unwrap_or(pattern);
    let filename = path.rsplit('/').next().unwrap_or(path);

    if let Some(star) = pattern.find('*') {
        let (prefix, suffix) = (&pattern[..star], &pattern[star + 1..]);
        filename.starts_with(prefix) && filename.ends_with(suffix) && filename.len() >= prefix.len() + suffix.len()
    } else {
        filename == pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_filename_at_any_depth() {
        assert!(glob_match("**/pom.xml", "a/b/pom.xml"));
        assert!(glob_match("**/pom.xml", "pom.xml"));
        assert!(!glob_match("**/pom.xml", "pom.xml.bak"));
    }

    #[test]
    fn matches_wildcard_within_filename() {
        assert!(glob_match("**/requirements*.txt", "src/requirements-dev.txt"));
        assert!(glob_match("**/requirements*.txt", "requirements.txt"));
        assert!(!glob_match("**/requirements*.txt", "requirements.toml"));
    }
}
