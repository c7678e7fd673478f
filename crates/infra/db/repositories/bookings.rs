use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{insert_into, prelude::*, update};
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            bookings::{BookingEntity, InsertBookingEntity},
            listings::ListingEntity,
            payments::PaymentEntity,
        },
        repositories::bookings::BookingRepository,
        value_objects::{
            bookings::{BookingDetailRecord, BookingTransition, CancelOutcome, StayRange},
            enums::booking_statuses::BookingStatus,
        },
    },
    infra::db::postgres::{
        postgres_connection::{PgPoolSquad, run_serializable},
        schema::{bookings, cohosts, listings, payments},
    },
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn create(&self, insert_booking_entity: InsertBookingEntity) -> Result<BookingEntity> {
        // Diesel is synchronous; run DB work on the blocking threadpool to
        // avoid stalling Tokio under load.
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<BookingEntity> {
            let mut conn = db_pool.get()?;

            let booking = insert_into(bookings::table)
                .values(&insert_booking_entity)
                .returning(BookingEntity::as_returning())
                .get_result::<BookingEntity>(&mut conn)?;

            Ok(booking)
        })
        .await??)
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<BookingEntity>> {
            let mut conn = db_pool.get()?;

            let booking = bookings::table
                .filter(bookings::id.eq(booking_id))
                .select(BookingEntity::as_select())
                .first::<BookingEntity>(&mut conn)
                .optional()?;

            Ok(booking)
        })
        .await??)
    }

    async fn find_detail(&self, booking_id: Uuid) -> Result<Option<BookingDetailRecord>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Option<BookingDetailRecord>> {
                let mut conn = db_pool.get()?;

                let row = bookings::table
                    .inner_join(listings::table)
                    .left_join(payments::table)
                    .filter(bookings::id.eq(booking_id))
                    .select((
                        BookingEntity::as_select(),
                        ListingEntity::as_select(),
                        Option::<PaymentEntity>::as_select(),
                    ))
                    .first::<(BookingEntity, ListingEntity, Option<PaymentEntity>)>(&mut conn)
                    .optional()?;

                Ok(row.map(|(booking, listing, payment)| BookingDetailRecord {
                    booking,
                    listing,
                    payment,
                }))
            })
            .await??,
        )
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookingDetailRecord>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(
            task::spawn_blocking(move || -> Result<Vec<BookingDetailRecord>> {
                let mut conn = db_pool.get()?;

                let host_listing_ids = listings::table
                    .filter(listings::host_user_id.eq(user_id))
                    .select(listings::id);
                let cohost_listing_ids = cohosts::table
                    .filter(cohosts::cohost_user_id.eq(user_id))
                    .select(cohosts::listing_id);

                let rows = bookings::table
                    .inner_join(listings::table)
                    .left_join(payments::table)
                    .filter(
                        bookings::guest_user_id
                            .eq(user_id)
                            .or(bookings::listing_id.eq_any(host_listing_ids))
                            .or(bookings::listing_id.eq_any(cohost_listing_ids)),
                    )
                    .order(bookings::created_at.desc())
                    .select((
                        BookingEntity::as_select(),
                        ListingEntity::as_select(),
                        Option::<PaymentEntity>::as_select(),
                    ))
                    .load::<(BookingEntity, ListingEntity, Option<PaymentEntity>)>(&mut conn)?;

                Ok(rows
                    .into_iter()
                    .map(|(booking, listing, payment)| BookingDetailRecord {
                        booking,
                        listing,
                        payment,
                    })
                    .collect())
            })
            .await??,
        )
    }

    async fn list_confirmed_for_listing(&self, listing_id: Uuid) -> Result<Vec<BookingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<BookingEntity>> {
            let mut conn = db_pool.get()?;

            let confirmed = bookings::table
                .filter(bookings::listing_id.eq(listing_id))
                .filter(bookings::status.eq(BookingStatus::Confirmed.to_string()))
                .order(bookings::start_date.asc())
                .select(BookingEntity::as_select())
                .load::<BookingEntity>(&mut conn)?;

            Ok(confirmed)
        })
        .await??)
    }

    async fn count_active_for_guest(&self, guest_user_id: Uuid, today: NaiveDate) -> Result<i64> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<i64> {
            let mut conn = db_pool.get()?;

            let count = bookings::table
                .filter(bookings::guest_user_id.eq(guest_user_id))
                .filter(bookings::status.ne(BookingStatus::Rejected.to_string()))
                .filter(bookings::end_date.ge(today))
                .count()
                .get_result::<i64>(&mut conn)?;

            Ok(count)
        })
        .await??)
    }

    async fn has_conflict(
        &self,
        listing_id: Uuid,
        range: StayRange,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<bool> {
            let mut conn = db_pool.get()?;

            let conflicts = match exclude_booking_id {
                Some(exclude) => bookings::table
                    .filter(bookings::listing_id.eq(listing_id))
                    .filter(bookings::status.eq(BookingStatus::Confirmed.to_string()))
                    .filter(bookings::id.ne(exclude))
                    .filter(bookings::start_date.lt(range.end()))
                    .filter(bookings::end_date.gt(range.start()))
                    .count()
                    .get_result::<i64>(&mut conn)?,
                None => bookings::table
                    .filter(bookings::listing_id.eq(listing_id))
                    .filter(bookings::status.eq(BookingStatus::Confirmed.to_string()))
                    .filter(bookings::start_date.lt(range.end()))
                    .filter(bookings::end_date.gt(range.start()))
                    .count()
                    .get_result::<i64>(&mut conn)?,
            };

            Ok(conflicts > 0)
        })
        .await??)
    }

    async fn confirm_pending(
        &self,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<BookingTransition> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<BookingTransition> {
            let mut conn = db_pool.get()?;

            let transition = run_serializable(&mut conn, |conn| {
                let booking = bookings::table
                    .filter(bookings::id.eq(booking_id))
                    .select(BookingEntity::as_select())
                    .first::<BookingEntity>(conn)?;

                if BookingStatus::from_str(&booking.status) != Some(BookingStatus::Pending) {
                    return Ok(BookingTransition::NoOp(booking));
                }

                let clashes = bookings::table
                    .filter(bookings::listing_id.eq(booking.listing_id))
                    .filter(bookings::status.eq(BookingStatus::Confirmed.to_string()))
                    .filter(bookings::id.ne(booking.id))
                    .filter(bookings::start_date.lt(booking.end_date))
                    .filter(bookings::end_date.gt(booking.start_date))
                    .count()
                    .get_result::<i64>(conn)?;

                if clashes > 0 {
                    return Ok(BookingTransition::Conflict);
                }

                let updated = update(bookings::table.filter(bookings::id.eq(booking.id)))
                    .set((
                        bookings::status.eq(BookingStatus::AwaitingPayment.to_string()),
                        bookings::updated_at.eq(now),
                    ))
                    .returning(BookingEntity::as_returning())
                    .get_result::<BookingEntity>(conn)?;

                Ok(BookingTransition::Applied(updated))
            })?;

            Ok(transition)
        })
        .await??)
    }

    async fn mark_rejected(&self, booking_id: Uuid, now: DateTime<Utc>) -> Result<BookingEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<BookingEntity> {
            let mut conn = db_pool.get()?;

            let rejected = update(bookings::table.filter(bookings::id.eq(booking_id)))
                .set((
                    bookings::status.eq(BookingStatus::Rejected.to_string()),
                    bookings::updated_at.eq(now),
                ))
                .returning(BookingEntity::as_returning())
                .get_result::<BookingEntity>(&mut conn)?;

            Ok(rejected)
        })
        .await??)
    }

    async fn cancel_booking(&self, booking_id: Uuid, now: DateTime<Utc>) -> Result<CancelOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<CancelOutcome> {
            let mut conn = db_pool.get()?;

            let outcome = conn.transaction::<CancelOutcome, diesel::result::Error, _>(|conn| {
                let booking = bookings::table
                    .filter(bookings::id.eq(booking_id))
                    .select(BookingEntity::as_select())
                    .for_update()
                    .first::<BookingEntity>(conn)?;

                if matches!(
                    BookingStatus::from_str(&booking.status),
                    Some(BookingStatus::Cancelled) | Some(BookingStatus::Completed)
                ) {
                    return Ok(CancelOutcome::NoOp(booking));
                }

                let cancelled = update(bookings::table.filter(bookings::id.eq(booking.id)))
                    .set((
                        bookings::status.eq(BookingStatus::Cancelled.to_string()),
                        bookings::updated_at.eq(now),
                    ))
                    .returning(BookingEntity::as_returning())
                    .get_result::<BookingEntity>(conn)?;

                Ok(CancelOutcome::Cancelled(cancelled))
            })?;

            Ok(outcome)
        })
        .await??)
    }

    async fn complete_past_bookings(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Vec<Uuid>> {
            let mut conn = db_pool.get()?;

            let completed_ids = update(
                bookings::table
                    .filter(bookings::status.eq(BookingStatus::Confirmed.to_string()))
                    .filter(bookings::end_date.lt(today)),
            )
            .set((
                bookings::status.eq(BookingStatus::Completed.to_string()),
                bookings::completed_at.eq(now),
                bookings::updated_at.eq(now),
            ))
            .returning(bookings::id)
            .get_results::<Uuid>(&mut conn)?;

            Ok(completed_ids)
        })
        .await??)
    }
}
