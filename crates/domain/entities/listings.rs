use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::listings;

/// Listings are owned by the listing management service; the booking core
/// only ever reads them.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = listings)]
pub struct ListingEntity {
    pub id: Uuid,
    pub host_user_id: Uuid,
    pub title: String,
    pub price_per_night: i64,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
