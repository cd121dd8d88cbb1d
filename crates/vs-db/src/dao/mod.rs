//! One DAO per entity. Each takes a `&PgPool` rather than holding a
//! connection, so every concurrent unit of work (per-library collect,
//! per-event classify, per-project scan, per-vuln analyze) checks out its
//! own connection per call and never shares a session across tasks
//! (spec.md §5).

pub mod agent_run;
pub mod client_vuln;
pub mod event;
pub mod library;
pub mod pagination;
pub mod project;
pub mod project_dependency;
pub mod upstream_vuln;

pub use agent_run::AgentRunDao;
pub use client_vuln::ClientVulnDao;
pub use event::EventDao;
pub use library::LibraryDao;
pub use project::ProjectDao;
pub use project_dependency::ProjectDependencyDao;
pub use upstream_vuln::UpstreamVulnDao;
