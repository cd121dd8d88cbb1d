//! Data-access layer for VulnSentinel.
//!
//! Specifies the schema as a contract (`schema.sql`) and exposes one DAO per
//! entity. No engine crate talks to `sqlx` directly - they all go through
//! `vs_db::dao::*`, which keeps the idempotency and ownership rules from
//! spec.md §3 enforced in one place instead of re-derived at every call
//! site.

pub mod dao;
pub mod entities;

pub use sqlx::PgPool;
