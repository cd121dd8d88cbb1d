//! Event Collector engine (spec.md §4.3): per-library commit/PR/tag/bug-issue
//! polling against `vs_github::GitHubClient`, batched into idempotent
//! `events` rows.

pub mod engine;

pub use engine::{CollectorEngine, LibraryCollectReport};
