//! Notification Engine (spec.md §4.8): finds verified-and-recorded
//! client-vulns not yet notified, dispatches to every enabled channel, and
//! advances `status` on success.

pub mod channels;
pub mod engine;
pub mod error;
pub mod notice;
pub mod notifier;

pub use channels::NotificationChannel;
pub use engine::NotificationEngine;
pub use error::ChannelError;
pub use notice::VulnNotice;
pub use notifier::Notifier;
