use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::enums::booking_statuses::BookingStatus;

/// Structured events the state machine hands to the notification gateway.
/// Fan-out to mail/push/in-app happens downstream.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    BookingRequested {
        booking_id: Uuid,
        listing_id: Uuid,
        guest_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    BookingStatusChanged {
        booking_id: Uuid,
        listing_id: Uuid,
        guest_id: Uuid,
        status: BookingStatus,
        host_recipient: bool,
    },
    PaymentCaptured {
        payment_id: Uuid,
        booking_id: Uuid,
        amount_total: i64,
    },
    PaymentRefunded {
        payment_id: Uuid,
        booking_id: Uuid,
        amount_total: i64,
    },
}
