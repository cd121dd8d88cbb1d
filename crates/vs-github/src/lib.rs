//! GitHub REST v3 client shared by the Collector and the agent tool server.

pub mod client;
pub mod pagination;
pub mod refs;
pub mod types;

pub use client::{GitHubClient, RateLimitState};
