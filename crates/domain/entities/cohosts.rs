use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::cohosts;

/// Co-host grants are managed by the permission service; read-only here.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = cohosts)]
pub struct CohostEntity {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub cohost_user_id: Uuid,
    pub can_edit_listings: bool,
    pub created_at: DateTime<Utc>,
}
