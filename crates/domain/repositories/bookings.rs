use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity},
    value_objects::bookings::{BookingDetailRecord, BookingTransition, CancelOutcome, StayRange},
};

#[automock]
#[async_trait]
pub trait BookingRepository {
    async fn create(&self, insert_booking_entity: InsertBookingEntity) -> Result<BookingEntity>;

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>>;

    async fn find_detail(&self, booking_id: Uuid) -> Result<Option<BookingDetailRecord>>;

    /// Bookings the user sees: own stays plus everything on listings they
    /// host or co-host, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookingDetailRecord>>;

    async fn list_confirmed_for_listing(&self, listing_id: Uuid) -> Result<Vec<BookingEntity>>;

    async fn count_active_for_guest(&self, guest_user_id: Uuid, today: NaiveDate) -> Result<i64>;

    /// Pure availability scan: does any confirmed stay on the listing
    /// intersect the requested half-open range?
    async fn has_conflict(
        &self,
        listing_id: Uuid,
        range: StayRange,
        exclude_booking_id: Option<Uuid>,
    ) -> Result<bool>;

    /// pending -> awaiting_payment, re-checking availability against the
    /// listing's confirmed stays inside the same transaction.
    async fn confirm_pending(
        &self,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<BookingTransition>;

    /// Writes `rejected` whatever the current status.
    async fn mark_rejected(&self, booking_id: Uuid, now: DateTime<Utc>) -> Result<BookingEntity>;

    /// -> cancelled, unless the booking already reached a terminal state.
    async fn cancel_booking(&self, booking_id: Uuid, now: DateTime<Utc>) -> Result<CancelOutcome>;

    /// Bulk-closes confirmed stays whose checkout date has passed; returns
    /// the ids that were transitioned.
    async fn complete_past_bookings(
        &self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>>;
}
