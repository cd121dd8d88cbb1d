//! The hybrid poll-and-wake scheduler (spec.md §4.9): one `EngineLoop` per
//! engine, chained by `tokio::sync::Notify` wake signals so downstream
//! engines react within seconds of upstream work instead of waiting out
//! their own interval.

pub mod engine_loop;
pub mod intervals;
pub mod scheduler;

pub use engine_loop::{EngineLoop, RunFn};
pub use scheduler::Scheduler;
