use uuid::Uuid;

/// Capability snapshot for one listing, resolved once at the top of every
/// state-changing operation. The host and co-hosts holding the edit grant
/// may decide on bookings.
#[derive(Debug, Clone)]
pub struct ListingAccess {
    pub host_user_id: Uuid,
    pub editor_cohost_ids: Vec<Uuid>,
}

impl ListingAccess {
    pub fn can_manage(&self, actor_id: Uuid) -> bool {
        self.host_user_id == actor_id || self.editor_cohost_ids.contains(&actor_id)
    }

    /// Everyone who should hear about host-side booking activity.
    pub fn host_side_recipients(&self) -> Vec<Uuid> {
        let mut recipients = vec![self.host_user_id];
        recipients.extend(self.editor_cohost_ids.iter().copied());
        recipients.dedup();
        recipients
    }
}
