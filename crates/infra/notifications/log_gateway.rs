use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    repositories::notifications::NotificationGateway,
    value_objects::notifications::BookingEvent,
};

/// Hands events to the log stream the delivery pipeline tails; mail, push and
/// in-app fan-out live in the notification service, not here.
#[derive(Debug, Clone, Default)]
pub struct LogNotificationGateway;

#[async_trait]
impl NotificationGateway for LogNotificationGateway {
    async fn notify(&self, event: BookingEvent, recipients: Vec<Uuid>) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        info!(recipients = ?recipients, payload = %payload, "notification dispatched");
        Ok(())
    }
}
