use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::payments::{InsertPaymentEntity, PaymentEntity},
    value_objects::payments::SettlementOutcome,
};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    /// Guarded creation keyed on the booking: the first writer wins and every
    /// later call gets that same row back.
    async fn create_if_absent(
        &self,
        insert_payment_entity: InsertPaymentEntity,
    ) -> Result<PaymentEntity>;

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>>;

    /// The settlement transaction: stamps authorization and capture and
    /// confirms the owning booking as one unit, re-checking that the booking
    /// still awaits payment and that no overlapping stay got confirmed first.
    async fn authorize_and_capture(
        &self,
        payment_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome>;

    /// Refunds the booking's payment when it holds money (authorized or
    /// captured); anything else is left untouched.
    async fn refund_if_settled(
        &self,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>>;
}
