//! Shared primitives for the VulnSentinel workspace.
//!
//! Every other crate in the workspace depends on this one for the error
//! taxonomy, opaque ids, cursor pagination, structured logging init, and
//! environment-driven configuration. It has no dependency on any other
//! `vs-*` crate.

pub mod config;
pub mod cursor;
pub mod error;
pub mod ids;
pub mod logging;
pub mod repo_ref;
pub mod retry;

pub use error::{VsError, VsResult};
