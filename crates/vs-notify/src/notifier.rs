//! Central notification dispatcher, grounded directly on the teacher's
//! `notify::Notifier` - fans one event out to every enabled channel and
//! waits for delivery rather than firing-and-forgetting, because the
//! Notification Engine needs to know whether to advance `status`.

use std::sync::Arc;

use crate::channels::{EmailChannel, InSystemChannel, NotificationChannel, WebhookChannel};
use crate::error::ChannelError;
use crate::notice::VulnNotice;

pub struct Notifier {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl Notifier {
    #[must_use]
    pub fn from_env() -> Self {
        let mut channels: Vec<Arc<dyn NotificationChannel>> = vec![Arc::new(InSystemChannel)];

        let email = EmailChannel::from_env();
        if email.enabled() {
            channels.push(Arc::new(email));
        }

        let webhook = WebhookChannel::from_env();
        if webhook.enabled() {
            channels.push(Arc::new(webhook));
        }

        Self { channels }
    }

    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Dispatch to every enabled channel and wait for all of them. Returns
    /// one result per channel that was actually attempted.
    pub async fn notify_and_wait(&self, notice: &VulnNotice) -> Vec<(&'static str, Result<(), ChannelError>)> {
        let mut results = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            if !channel.enabled() {
                continue;
            }
            let result = channel.send(notice).await;
            results.push((channel.name(), result));
        }
        results
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::from_env()
    }
}
