use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::prelude::*;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{entities::listings::ListingEntity, repositories::listings::ListingRepository},
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::listings},
};

pub struct ListingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ListingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ListingRepository for ListingPostgres {
    async fn find_by_id(&self, listing_id: Uuid) -> Result<Option<ListingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<ListingEntity>> {
            let mut conn = db_pool.get()?;

            let listing = listings::table
                .filter(listings::id.eq(listing_id))
                .select(ListingEntity::as_select())
                .first::<ListingEntity>(&mut conn)
                .optional()?;

            Ok(listing)
        })
        .await??)
    }
}
