use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

#[automock]
#[async_trait]
pub trait CohostRepository {
    /// Any co-host grant on the listing, whatever its capabilities.
    async fn is_cohost(&self, listing_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Co-hosts holding the edit grant; they may decide on bookings and are
    /// notified alongside the host.
    async fn list_editor_ids(&self, listing_id: Uuid) -> Result<Vec<Uuid>>;
}
