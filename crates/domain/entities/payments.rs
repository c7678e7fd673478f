use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub guest_user_id: Uuid,
    pub host_user_id: Uuid,
    pub amount_base: i64,
    pub amount_vat: i64,
    pub amount_service: i64,
    pub amount_total: i64,
    pub commission_amount: i64,
    pub payout_amount: i64,
    pub status: String,
    pub authorized_at: Option<DateTime<Utc>>,
    pub captured_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub booking_id: Uuid,
    pub guest_user_id: Uuid,
    pub host_user_id: Uuid,
    pub amount_base: i64,
    pub amount_vat: i64,
    pub amount_service: i64,
    pub amount_total: i64,
    pub commission_amount: i64,
    pub payout_amount: i64,
    pub status: String,
}
