use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::notifications::BookingEvent;

/// Outbound port for state-change events. Delivery is best-effort: callers
/// log failures and never let them fail the transition that fired the event.
#[automock]
#[async_trait]
pub trait NotificationGateway {
    async fn notify(&self, event: BookingEvent, recipients: Vec<Uuid>) -> Result<()>;
}
