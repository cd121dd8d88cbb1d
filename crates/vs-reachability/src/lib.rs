//! Reachability Analyzer (spec.md §4.7): delegates the is-it-reachable
//! verdict to an external static-analysis collaborator and advances
//! `client_vulns` pipeline state accordingly.

pub mod backend;
pub mod engine;

pub use backend::{HttpReachabilityBackend, ReachabilityBackend, ReachabilityError, ReachabilityVerdict, VulnDescriptor};
pub use engine::ReachabilityEngine;
