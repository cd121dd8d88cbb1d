//! `ScannedDependency` - the parser output shape every `ManifestParser`
//! returns (spec.md §4.2 step 4).

/// One dependency extracted from a single manifest file. `library_repo_url`
/// is `None` when the manifest gives no way to resolve a repo URL (e.g. a
/// bare CMake `find_package(Foo)`) - such rows are surfaced in the scan
/// result for user visibility but never inserted (spec.md §4.2 step 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDependency {
    pub library_name: String,
    pub library_repo_url: Option<String>,
    pub constraint_expr: Option<String>,
    pub resolved_version: Option<String>,
    pub source_file: String,
    pub detection_method: &'static str,
}

impl ScannedDependency {
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.library_repo_url.is_some()
    }
}
