//! Dependency Scanner engine (spec.md §4.2): discovers dependency manifests
//! in a monitored project's repo, parses them with a pluggable registry of
//! 11 format parsers, and reconciles the results into `libraries` and
//! `project_dependencies`.

pub mod dependency;
pub mod engine;
pub mod parser;
pub mod parsers;

pub use dependency::ScannedDependency;
pub use engine::{ScanReport, ScannerEngine};
pub use parser::{ManifestParser, ParserRegistry};
