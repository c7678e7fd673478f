use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::{bookings::BookingEntity, payments::PaymentEntity},
    value_objects::enums::payment_statuses::PaymentStatus,
};

/// Platform fee configuration; amounts are computed once at intent creation
/// and never recomputed for a booking.
#[derive(Debug, Clone, Copy)]
pub struct PricingRates {
    pub vat_rate: f64,
    pub service_fee_rate: f64,
    pub commission_rate: f64,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            vat_rate: 0.20,
            service_fee_rate: 0.07,
            commission_rate: 0.12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub amount_base: i64,
    pub amount_vat: i64,
    pub amount_service: i64,
    pub amount_total: i64,
    pub commission_amount: i64,
    pub payout_amount: i64,
}

impl PriceBreakdown {
    pub fn compute(nights: i64, price_per_night: i64, rates: &PricingRates) -> Self {
        let amount_base = nights * price_per_night;
        let amount_vat = round_share(amount_base, rates.vat_rate);
        let amount_service = round_share(amount_base, rates.service_fee_rate);
        let commission_amount = round_share(amount_base, rates.commission_rate);

        Self {
            amount_base,
            amount_vat,
            amount_service,
            amount_total: amount_base + amount_vat + amount_service,
            commission_amount,
            payout_amount: (amount_base - commission_amount).max(0),
        }
    }
}

fn round_share(amount: i64, rate: f64) -> i64 {
    (amount as f64 * rate).round() as i64
}

/// Result of the one settlement transaction: authorization and capture land
/// together with the booking confirmation, or not at all.
#[derive(Debug)]
pub enum SettlementOutcome {
    Captured {
        payment: PaymentEntity,
        booking: BookingEntity,
    },
    NoOp(PaymentEntity),
    /// The booking left `awaiting_payment` or an overlapping stay got
    /// confirmed first; the payment was marked failed in the same transaction.
    Conflict(PaymentEntity),
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentDto {
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
    pub status: PaymentStatus,
    pub authorized_at: Option<DateTime<Utc>>,
    pub captured_at: Option<DateTime<Utc>>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentDto {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            booking_id: entity.booking_id,
            guest_user_id: entity.guest_user_id,
            host_user_id: entity.host_user_id,
            amount_base: entity.amount_base,
            amount_vat: entity.amount_vat,
            amount_service: entity.amount_service,
            amount_total: entity.amount_total,
            commission_amount: entity.commission_amount,
            payout_amount: entity.payout_amount,
            status: PaymentStatus::from_str(&entity.status)
                .unwrap_or(PaymentStatus::RequiresAuthorization),
            authorized_at: entity.authorized_at,
            captured_at: entity.captured_at,
            refunded_at: entity.refunded_at,
            created_at: entity.created_at,
        }
    }
}
