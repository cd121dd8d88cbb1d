//! Generic webhook notification channel, grounded on the teacher's
//! `SlackChannel` - a thin `reqwest` POST of a JSON payload to a configured
//! URL.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::ChannelError;
use crate::notice::VulnNotice;
use crate::NotificationChannel;

const ENV_WEBHOOK_URL: &str = "NOTIFY_WEBHOOK_URL";

pub struct WebhookChannel {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl WebhookChannel {
    #[must_use]
    pub fn from_env() -> Self {
        let webhook_url = std::env::var(ENV_WEBHOOK_URL).ok();
        if webhook_url.is_some() {
            debug!("webhook notifications enabled");
        } else {
            debug!("webhook notifications disabled ({ENV_WEBHOOK_URL} not set)");
        }
        Self { webhook_url, client: reqwest::Client::new() }
    }

    #[must_use]
    pub fn new(webhook_url: String) -> Self {
        Self { webhook_url: Some(webhook_url), client: reqwest::Client::new() }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    title: String,
    notice: &'a VulnNotice,
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn send(&self, notice: &VulnNotice) -> Result<(), ChannelError> {
        let Some(url) = &self.webhook_url else {
            return Err(ChannelError::NotConfigured(ENV_WEBHOOK_URL.to_string()));
        };

        let payload = WebhookPayload { title: notice.title(), notice };
        self.client.post(url).json(&payload).send().await?.error_for_status()?;
        Ok(())
    }
}
