//! Impact Engine (spec.md §4.6): fans a published upstream vuln out to a
//! `client_vulns` row per dependent project. No version matching - a
//! pass-through that defers the affected-or-not verdict to Reachability.

pub mod engine;

pub use engine::{ImpactEngine, ImpactReport};
