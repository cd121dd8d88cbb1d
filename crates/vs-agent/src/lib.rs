//! The LLM-agent substrate shared by the Classifier and Analyzer engines
//! (spec.md §4.1): provider client trait + registry, MCP-style tool server,
//! `AgentContext`, and the `BaseAgent` tool-use loop.
//!
//! Every `agent.run()` builds its own message list, its own `AgentContext`,
//! and its own `ToolServer` - concurrent runs share no mutable state (spec.md
//! §4.1 "Concurrency invariants"). The `ProviderRegistry` and the underlying
//! `reqwest` clients are the only process-wide singletons, and both are
//! stateless.

pub mod base_agent;
pub mod client;
pub mod compression;
pub mod context;
pub mod json_extract;
pub mod providers;
pub mod registry;
pub mod tools;

pub use base_agent::{AgentConfig, BaseAgent};
pub use context::{AgentContext, AgentResult};
pub use registry::ProviderRegistry;
pub use tools::{Tool, ToolServer};
