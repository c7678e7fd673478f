use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    entities::{bookings::BookingEntity, listings::ListingEntity, payments::PaymentEntity},
    value_objects::{enums::booking_statuses::BookingStatus, payments::PaymentDto},
};

/// Half-open interval intersection: `[s1, e1)` meets `[s2, e2)`. A checkout
/// day shared with the next check-in day is not a clash.
pub fn dates_overlap(s1: NaiveDate, e1: NaiveDate, s2: NaiveDate, e2: NaiveDate) -> bool {
    s1 < e2 && s2 < e1
}

/// Validated stay window: first night at `start`, checkout morning at `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl StayRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days().max(1)
    }
}

/// Result of a guarded status write executed inside one transaction.
#[derive(Debug)]
pub enum BookingTransition {
    Applied(BookingEntity),
    NoOp(BookingEntity),
    Conflict,
}

#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(BookingEntity),
    NoOp(BookingEntity),
}

/// One booking row together with its relations, as loaded for list/show.
#[derive(Debug)]
pub struct BookingDetailRecord {
    pub booking: BookingEntity,
    pub listing: ListingEntity,
    pub payment: Option<PaymentEntity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDto {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub guest_user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: BookingStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<BookingEntity> for BookingDto {
    fn from(entity: BookingEntity) -> Self {
        Self {
            id: entity.id,
            listing_id: entity.listing_id,
            guest_user_id: entity.guest_user_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            status: BookingStatus::from_str(&entity.status).unwrap_or(BookingStatus::Pending),
            paid_at: entity.paid_at,
            completed_at: entity.completed_at,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingSummaryDto {
    pub id: Uuid,
    pub host_user_id: Uuid,
    pub title: String,
    pub price_per_night: i64,
    pub capacity: i32,
}

impl From<ListingEntity> for ListingSummaryDto {
    fn from(entity: ListingEntity) -> Self {
        Self {
            id: entity.id,
            host_user_id: entity.host_user_id,
            title: entity.title,
            price_per_night: entity.price_per_night,
            capacity: entity.capacity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDetailDto {
    #[serde(flatten)]
    pub booking: BookingDto,
    pub listing: ListingSummaryDto,
    pub payment: Option<PaymentDto>,
}

impl From<BookingDetailRecord> for BookingDetailDto {
    fn from(record: BookingDetailRecord) -> Self {
        Self {
            booking: BookingDto::from(record.booking),
            listing: ListingSummaryDto::from(record.listing),
            payment: record.payment.map(PaymentDto::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn adjacent_stays_share_a_turnover_day() {
        // checkout on the 10th, next check-in on the 10th
        assert!(!dates_overlap(
            date(2024, 5, 7),
            date(2024, 5, 10),
            date(2024, 5, 10),
            date(2024, 5, 12),
        ));
    }

    #[test]
    fn one_shared_night_is_a_clash() {
        assert!(dates_overlap(
            date(2024, 5, 7),
            date(2024, 5, 11),
            date(2024, 5, 10),
            date(2024, 5, 12),
        ));
    }

    #[test]
    fn containment_is_a_clash_both_ways() {
        assert!(dates_overlap(
            date(2024, 5, 1),
            date(2024, 5, 30),
            date(2024, 5, 10),
            date(2024, 5, 12),
        ));
        assert!(dates_overlap(
            date(2024, 5, 10),
            date(2024, 5, 12),
            date(2024, 5, 1),
            date(2024, 5, 30),
        ));
    }

    #[test]
    fn stay_range_rejects_empty_and_inverted_windows() {
        assert!(StayRange::new(date(2024, 5, 10), date(2024, 5, 10)).is_none());
        assert!(StayRange::new(date(2024, 5, 10), date(2024, 5, 9)).is_none());
    }

    #[test]
    fn nights_counts_the_half_open_window() {
        let range = StayRange::new(date(2024, 5, 10), date(2024, 5, 13)).unwrap();
        assert_eq!(range.nights(), 3);

        let one_night = StayRange::new(date(2024, 5, 10), date(2024, 5, 11)).unwrap();
        assert_eq!(one_night.nights(), 1);
    }
}
