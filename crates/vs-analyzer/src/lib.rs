//! Vuln Analyzer engine (spec.md §4.5): turns a classified security-bugfix
//! event into one or more published `upstream_vulns` rows.

pub mod agent;
pub mod engine;
pub mod severity;

pub use agent::VulnAnalyzerAgent;
pub use engine::AnalyzerEngine;
