//! Email notification channel via a transactional-email HTTP API - same
//! thin-adapter shape as `WebhookChannel`, just a different target and a
//! recipient drawn from `VulnNotice::project_contact`.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::ChannelError;
use crate::notice::VulnNotice;
use crate::NotificationChannel;

const ENV_EMAIL_API_URL: &str = "NOTIFY_EMAIL_API_URL";
const ENV_EMAIL_API_KEY: &str = "NOTIFY_EMAIL_API_KEY";
const ENV_EMAIL_FROM: &str = "NOTIFY_EMAIL_FROM";

pub struct EmailChannel {
    api_url: Option<String>,
    api_key: Option<String>,
    from_address: String,
    client: reqwest::Client,
}

impl EmailChannel {
    #[must_use]
    pub fn from_env() -> Self {
        let api_url = std::env::var(ENV_EMAIL_API_URL).ok();
        let api_key = std::env::var(ENV_EMAIL_API_KEY).ok();
        let from_address = std::env::var(ENV_EMAIL_FROM).unwrap_or_else(|_| "alerts@vulnsentinel.local".to_string());

        if api_url.is_some() && api_key.is_some() {
            debug!("email notifications enabled");
        } else {
            debug!("email notifications disabled ({ENV_EMAIL_API_URL} / {ENV_EMAIL_API_KEY} not set)");
        }

        Self { api_url, api_key, from_address, client: reqwest::Client::new() }
    }
}

#[derive(Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    body: &'a VulnNotice,
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn enabled(&self) -> bool {
        self.api_url.is_some() && self.api_key.is_some()
    }

    async fn send(&self, notice: &VulnNotice) -> Result<(), ChannelError> {
        let (Some(api_url), Some(api_key)) = (&self.api_url, &self.api_key) else {
            return Err(ChannelError::NotConfigured(ENV_EMAIL_API_URL.to_string()));
        };
        let Some(to) = &notice.project_contact else {
            return Err(ChannelError::NotConfigured("project has no contact address".to_string()));
        };

        let request = EmailRequest { from: &self.from_address, to, subject: notice.title(), body: notice };
        self.client
            .post(api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
