use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{insert_into, prelude::*, update};
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::{
            bookings::BookingEntity,
            payments::{InsertPaymentEntity, PaymentEntity},
        },
        repositories::payments::PaymentRepository,
        value_objects::{
            bookings::dates_overlap,
            enums::{booking_statuses::BookingStatus, payment_statuses::PaymentStatus},
            payments::SettlementOutcome,
        },
    },
    infra::db::postgres::{
        postgres_connection::{PgPoolSquad, run_serializable},
        schema::{bookings, payments},
    },
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn create_if_absent(
        &self,
        insert_payment_entity: InsertPaymentEntity,
    ) -> Result<PaymentEntity> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<PaymentEntity> {
            let mut conn = db_pool.get()?;
            let booking_id = insert_payment_entity.booking_id;

            // payments.booking_id is unique; a racing second intent inserts
            // nothing and reads back the winner's row.
            insert_into(payments::table)
                .values(&insert_payment_entity)
                .on_conflict(payments::booking_id)
                .do_nothing()
                .execute(&mut conn)?;

            let payment = payments::table
                .filter(payments::booking_id.eq(booking_id))
                .select(PaymentEntity::as_select())
                .first::<PaymentEntity>(&mut conn)?;

            Ok(payment)
        })
        .await??)
    }

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PaymentEntity>> {
            let mut conn = db_pool.get()?;

            let payment = payments::table
                .filter(payments::id.eq(payment_id))
                .select(PaymentEntity::as_select())
                .first::<PaymentEntity>(&mut conn)
                .optional()?;

            Ok(payment)
        })
        .await??)
    }

    async fn authorize_and_capture(
        &self,
        payment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<SettlementOutcome> {
            let mut conn = db_pool.get()?;

            let outcome = run_serializable(&mut conn, |conn| {
                let payment = payments::table
                    .filter(payments::id.eq(payment_id))
                    .select(PaymentEntity::as_select())
                    .first::<PaymentEntity>(conn)?;

                if !matches!(
                    PaymentStatus::from_str(&payment.status),
                    Some(PaymentStatus::RequiresAuthorization) | Some(PaymentStatus::Failed)
                ) {
                    return Ok(SettlementOutcome::NoOp(payment));
                }

                let booking = bookings::table
                    .filter(bookings::id.eq(payment.booking_id))
                    .select(BookingEntity::as_select())
                    .first::<BookingEntity>(conn)?;

                let booking_open = BookingStatus::from_str(&booking.status)
                    == Some(BookingStatus::AwaitingPayment);

                let mut clash = false;
                if booking_open {
                    let confirmed = bookings::table
                        .filter(bookings::listing_id.eq(booking.listing_id))
                        .filter(bookings::status.eq(BookingStatus::Confirmed.to_string()))
                        .filter(bookings::id.ne(booking.id))
                        .select(BookingEntity::as_select())
                        .load::<BookingEntity>(conn)?;

                    clash = confirmed.iter().any(|other| {
                        dates_overlap(
                            booking.start_date,
                            booking.end_date,
                            other.start_date,
                            other.end_date,
                        )
                    });
                }

                if !booking_open || clash {
                    let failed = update(payments::table.filter(payments::id.eq(payment.id)))
                        .set((
                            payments::status.eq(PaymentStatus::Failed.to_string()),
                            payments::updated_at.eq(now),
                        ))
                        .returning(PaymentEntity::as_returning())
                        .get_result::<PaymentEntity>(conn)?;

                    return Ok(SettlementOutcome::Conflict(failed));
                }

                let captured = update(payments::table.filter(payments::id.eq(payment.id)))
                    .set((
                        payments::status.eq(PaymentStatus::Captured.to_string()),
                        payments::authorized_at.eq(now),
                        payments::captured_at.eq(now),
                        payments::updated_at.eq(now),
                    ))
                    .returning(PaymentEntity::as_returning())
                    .get_result::<PaymentEntity>(conn)?;

                let confirmed_booking =
                    update(bookings::table.filter(bookings::id.eq(booking.id)))
                        .set((
                            bookings::status.eq(BookingStatus::Confirmed.to_string()),
                            bookings::paid_at.eq(now),
                            bookings::updated_at.eq(now),
                        ))
                        .returning(BookingEntity::as_returning())
                        .get_result::<BookingEntity>(conn)?;

                Ok(SettlementOutcome::Captured {
                    payment: captured,
                    booking: confirmed_booking,
                })
            })?;

            Ok(outcome)
        })
        .await??)
    }

    async fn refund_if_settled(
        &self,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        Ok(task::spawn_blocking(move || -> Result<Option<PaymentEntity>> {
            let mut conn = db_pool.get()?;

            let refunded = conn
                .transaction::<Option<PaymentEntity>, diesel::result::Error, _>(|conn| {
                    let payment = payments::table
                        .filter(payments::booking_id.eq(booking_id))
                        .select(PaymentEntity::as_select())
                        .for_update()
                        .first::<PaymentEntity>(conn)
                        .optional()?;

                    let Some(payment) = payment else {
                        return Ok(None);
                    };

                    let settled = PaymentStatus::from_str(&payment.status)
                        .is_some_and(|status| status.is_settled());
                    if !settled {
                        return Ok(None);
                    }

                    let refunded = update(payments::table.filter(payments::id.eq(payment.id)))
                        .set((
                            payments::status.eq(PaymentStatus::Refunded.to_string()),
                            payments::refunded_at.eq(now),
                            payments::updated_at.eq(now),
                        ))
                        .returning(PaymentEntity::as_returning())
                        .get_result::<PaymentEntity>(conn)?;

                    Ok(Some(refunded))
                })?;

            Ok(refunded)
        })
        .await??)
    }
}
