//! Notification channel implementations, grounded directly on the teacher's
//! `notify::channels` trait-object abstraction.

pub mod email;
pub mod in_system;
pub mod webhook;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::notice::VulnNotice;

/// Trait for notification channels (email, webhook, in-system).
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    fn enabled(&self) -> bool;

    async fn send(&self, notice: &VulnNotice) -> Result<(), ChannelError>;
}

pub use email::EmailChannel;
pub use in_system::InSystemChannel;
pub use webhook::WebhookChannel;
