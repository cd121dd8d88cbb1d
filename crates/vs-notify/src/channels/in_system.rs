//! In-system channel: the dashboard reads `client_vulns` directly, so
//! "delivery" here is the `status = 'reported'` transition the engine
//! already performs. Always enabled so a deployment with no external
//! channels configured still has somewhere the alert surfaces.

use async_trait::async_trait;
use tracing::info;

use crate::error::ChannelError;
use crate::notice::VulnNotice;
use crate::NotificationChannel;

pub struct InSystemChannel;

#[async_trait]
impl NotificationChannel for InSystemChannel {
    fn name(&self) -> &'static str {
        "in_system"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, notice: &VulnNotice) -> Result<(), ChannelError> {
        info!(client_vuln_id = %notice.client_vuln_id, title = %notice.title(), "vulnerability surfaced on dashboard");
        Ok(())
    }
}
