use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use diesel::{dsl::exists, prelude::*, select};
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::repositories::cohosts::CohostRepository,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::cohosts},
};

pub struct CohostPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CohostPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CohostRepository for CohostPostgres {
    async fn is_cohost(&self, listing_id: Uuid, user_id: Uuid) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let granted = select(exists(
                cohosts::table
                    .filter(cohosts::listing_id.eq(listing_id))
                    .filter(cohosts::cohost_user_id.eq(user_id)),
            ))
            .get_result::<bool>(&mut conn)?;

            Ok(granted)
        })
        .await??)
    }

    async fn list_editor_ids(&self, listing_id: Uuid) -> Result<Vec<Uuid>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<Uuid>> {
            let mut conn = db_pool.get()?;

            let editor_ids = cohosts::table
                .filter(cohosts::listing_id.eq(listing_id))
                .filter(cohosts::can_edit_listings.eq(true))
                .select(cohosts::cohost_user_id)
                .load::<Uuid>(&mut conn)?;

            Ok(editor_ids)
        })
        .await??)
    }
}
