use std::sync::Arc;

use crates::domain::{
    clock::Clock,
    entities::payments::{InsertPaymentEntity, PaymentEntity},
    repositories::{
        bookings::BookingRepository, cohosts::CohostRepository, listings::ListingRepository,
        notifications::NotificationGateway, payments::PaymentRepository,
    },
    value_objects::{
        bookings::StayRange,
        enums::{booking_statuses::BookingStatus, payment_statuses::PaymentStatus},
        notifications::BookingEvent,
        payments::{PaymentDto, PriceBreakdown, PricingRates, SettlementOutcome},
    },
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateIntentModel {
    pub booking_id: Uuid,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("action not allowed")]
    Forbidden,
    #[error("dates are unavailable")]
    DatesUnavailable,
    #[error("booking not found")]
    BookingNotFound,
    #[error("payment not found")]
    PaymentNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::Forbidden => StatusCode::FORBIDDEN,
            PaymentError::DatesUnavailable => StatusCode::CONFLICT,
            PaymentError::BookingNotFound | PaymentError::PaymentNotFound => {
                StatusCode::NOT_FOUND
            }
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

/// The fake settlement engine: prices an intent once per booking, then drives
/// authorization and instant capture; capture confirms the owning booking.
pub struct PaymentUseCase<P, B, L, C, N, K>
where
    P: PaymentRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    payment_repo: Arc<P>,
    booking_repo: Arc<B>,
    listing_repo: Arc<L>,
    cohost_repo: Arc<C>,
    notifier: Arc<N>,
    clock: Arc<K>,
    rates: PricingRates,
}

impl<P, B, L, C, N, K> PaymentUseCase<P, B, L, C, N, K>
where
    P: PaymentRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    pub fn new(
        payment_repo: Arc<P>,
        booking_repo: Arc<B>,
        listing_repo: Arc<L>,
        cohost_repo: Arc<C>,
        notifier: Arc<N>,
        clock: Arc<K>,
        rates: PricingRates,
    ) -> Self {
        Self {
            payment_repo,
            booking_repo,
            listing_repo,
            cohost_repo,
            notifier,
            clock,
            rates,
        }
    }

    pub async fn create_intent(
        &self,
        actor_id: Uuid,
        model: CreateIntentModel,
    ) -> UseCaseResult<PaymentDto> {
        info!(%actor_id, booking_id = %model.booking_id, "payments: intent requested");

        let booking = self
            .booking_repo
            .find_by_id(model.booking_id)
            .await
            .map_err(|err| {
                error!(booking_id = %model.booking_id, db_error = ?err, "payments: booking lookup failed");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = PaymentError::BookingNotFound;
                warn!(
                    booking_id = %model.booking_id,
                    status = err.status_code().as_u16(),
                    "payments: unknown booking"
                );
                err
            })?;

        if booking.guest_user_id != actor_id {
            let err = PaymentError::Forbidden;
            warn!(
                %actor_id,
                booking_id = %booking.id,
                status = err.status_code().as_u16(),
                "payments: intent requested by someone other than the guest"
            );
            return Err(err);
        }

        if BookingStatus::from_str(&booking.status) != Some(BookingStatus::AwaitingPayment) {
            let err = PaymentError::Forbidden;
            warn!(
                booking_id = %booking.id,
                current_status = %booking.status,
                status = err.status_code().as_u16(),
                "payments: booking is not awaiting payment"
            );
            return Err(err);
        }

        let listing = self
            .listing_repo
            .find_by_id(booking.listing_id)
            .await
            .map_err(|err| {
                error!(listing_id = %booking.listing_id, db_error = ?err, "payments: listing lookup failed");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = PaymentError::BookingNotFound;
                warn!(
                    listing_id = %booking.listing_id,
                    status = err.status_code().as_u16(),
                    "payments: booking has no listing"
                );
                err
            })?;

        let nights = StayRange::new(booking.start_date, booking.end_date)
            .map(|range| range.nights())
            .unwrap_or(1);
        let breakdown = PriceBreakdown::compute(nights, listing.price_per_night, &self.rates);

        // First writer wins: a concurrent or repeated intent gets the row the
        // winner created, amounts untouched.
        let payment = self
            .payment_repo
            .create_if_absent(InsertPaymentEntity {
                booking_id: booking.id,
                guest_user_id: booking.guest_user_id,
                host_user_id: listing.host_user_id,
                amount_base: breakdown.amount_base,
                amount_vat: breakdown.amount_vat,
                amount_service: breakdown.amount_service,
                amount_total: breakdown.amount_total,
                commission_amount: breakdown.commission_amount,
                payout_amount: breakdown.payout_amount,
                status: PaymentStatus::RequiresAuthorization.to_string(),
            })
            .await
            .map_err(|err| {
                error!(booking_id = %booking.id, db_error = ?err, "payments: intent creation failed");
                PaymentError::Internal(err)
            })?;

        info!(
            payment_id = %payment.id,
            booking_id = %booking.id,
            amount_total = payment.amount_total,
            "payments: intent ready"
        );
        Ok(PaymentDto::from(payment))
    }

    pub async fn authorize(&self, actor_id: Uuid, payment_id: Uuid) -> UseCaseResult<PaymentDto> {
        let payment = self.load_payment(payment_id).await?;

        if payment.guest_user_id != actor_id {
            let err = PaymentError::Forbidden;
            warn!(
                %actor_id,
                %payment_id,
                status = err.status_code().as_u16(),
                "payments: authorize requested by someone other than the guest"
            );
            return Err(err);
        }

        if !matches!(
            PaymentStatus::from_str(&payment.status),
            Some(PaymentStatus::RequiresAuthorization) | Some(PaymentStatus::Failed)
        ) {
            info!(
                %payment_id,
                current_status = %payment.status,
                "payments: authorize is a no-op"
            );
            return Ok(PaymentDto::from(payment));
        }

        // Instant-settlement processor: authorization rolls straight into
        // capture, and capture confirms the booking in the same transaction.
        let outcome = self
            .payment_repo
            .authorize_and_capture(payment.id, self.clock.now())
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: settlement transaction failed");
                PaymentError::Internal(err)
            })?;

        match outcome {
            SettlementOutcome::Captured { payment, booking } => {
                info!(
                    payment_id = %payment.id,
                    booking_id = %booking.id,
                    amount_total = payment.amount_total,
                    "payments: captured, booking confirmed"
                );

                let mut recipients = vec![payment.guest_user_id, payment.host_user_id];
                match self.cohost_repo.list_editor_ids(booking.listing_id).await {
                    Ok(editor_ids) => recipients.extend(editor_ids),
                    Err(err) => {
                        warn!(
                            listing_id = %booking.listing_id,
                            error = ?err,
                            "payments: editor lookup failed, notifying host and guest only"
                        );
                    }
                }
                self.dispatch(
                    BookingEvent::PaymentCaptured {
                        payment_id: payment.id,
                        booking_id: booking.id,
                        amount_total: payment.amount_total,
                    },
                    recipients,
                )
                .await;

                Ok(PaymentDto::from(payment))
            }
            SettlementOutcome::NoOp(current) => {
                info!(
                    payment_id = %current.id,
                    current_status = %current.status,
                    "payments: settlement already ran"
                );
                Ok(PaymentDto::from(current))
            }
            SettlementOutcome::Conflict(failed) => {
                let err = PaymentError::DatesUnavailable;
                warn!(
                    payment_id = %failed.id,
                    status = err.status_code().as_u16(),
                    "payments: booking no longer capturable, payment marked failed"
                );
                Err(err)
            }
        }
    }

    async fn load_payment(&self, payment_id: Uuid) -> UseCaseResult<PaymentEntity> {
        self.payment_repo
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: payment lookup failed");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = PaymentError::PaymentNotFound;
                warn!(%payment_id, status = err.status_code().as_u16(), "payments: unknown payment");
                err
            })
    }

    async fn dispatch(&self, event: BookingEvent, recipients: Vec<Uuid>) {
        if recipients.is_empty() {
            return;
        }
        if let Err(err) = self.notifier.notify(event, recipients).await {
            warn!(error = ?err, "payments: notification dispatch failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use crates::domain::{
        clock::MockClock,
        entities::{bookings::BookingEntity, listings::ListingEntity},
        repositories::{
            bookings::MockBookingRepository, cohosts::MockCohostRepository,
            listings::MockListingRepository, notifications::MockNotificationGateway,
            payments::MockPaymentRepository,
        },
    };
    use mockall::predicate::eq;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn listing(host_user_id: Uuid) -> ListingEntity {
        ListingEntity {
            id: Uuid::new_v4(),
            host_user_id,
            title: "Villa".to_string(),
            price_per_night: 100,
            capacity: 4,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    fn awaiting_payment_booking(listing: &ListingEntity, guest_user_id: Uuid) -> BookingEntity {
        BookingEntity {
            id: Uuid::new_v4(),
            listing_id: listing.id,
            guest_user_id,
            start_date: date(2024, 5, 10),
            end_date: date(2024, 5, 13),
            status: BookingStatus::AwaitingPayment.to_string(),
            paid_at: None,
            completed_at: None,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    fn payment_row(booking: &BookingEntity, host: Uuid, status: PaymentStatus) -> PaymentEntity {
        PaymentEntity {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            guest_user_id: booking.guest_user_id,
            host_user_id: host,
            amount_base: 300,
            amount_vat: 60,
            amount_service: 21,
            amount_total: 381,
            commission_amount: 36,
            payout_amount: 264,
            status: status.to_string(),
            authorized_at: None,
            captured_at: None,
            refunded_at: None,
            created_at: fixed_now(),
            updated_at: fixed_now(),
        }
    }

    struct Ports {
        payments: MockPaymentRepository,
        bookings: MockBookingRepository,
        listings: MockListingRepository,
        cohosts: MockCohostRepository,
        notifier: MockNotificationGateway,
        clock: MockClock,
    }

    impl Ports {
        fn new() -> Self {
            let mut clock = MockClock::new();
            clock.expect_now().returning(fixed_now);
            clock.expect_today().returning(|| date(2024, 5, 1));

            Self {
                payments: MockPaymentRepository::new(),
                bookings: MockBookingRepository::new(),
                listings: MockListingRepository::new(),
                cohosts: MockCohostRepository::new(),
                notifier: MockNotificationGateway::new(),
                clock,
            }
        }

        fn into_usecase(
            self,
        ) -> PaymentUseCase<
            MockPaymentRepository,
            MockBookingRepository,
            MockListingRepository,
            MockCohostRepository,
            MockNotificationGateway,
            MockClock,
        > {
            PaymentUseCase::new(
                Arc::new(self.payments),
                Arc::new(self.bookings),
                Arc::new(self.listings),
                Arc::new(self.cohosts),
                Arc::new(self.notifier),
                Arc::new(self.clock),
                PricingRates::default(),
            )
        }
    }

    #[tokio::test]
    async fn intent_prices_three_nights_with_default_rates() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let mut ports = Ports::new();

        let found_booking = booking.clone();
        ports
            .bookings
            .expect_find_by_id()
            .with(eq(booking.id))
            .returning(move |_| Ok(Some(found_booking.clone())));
        let found_listing = listing_row.clone();
        ports
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found_listing.clone())));

        let created = payment_row(&booking, host, PaymentStatus::RequiresAuthorization);
        let row = created.clone();
        ports
            .payments
            .expect_create_if_absent()
            .withf(move |insert| {
                insert.amount_base == 300
                    && insert.amount_vat == 60
                    && insert.amount_service == 21
                    && insert.amount_total == 381
                    && insert.commission_amount == 36
                    && insert.payout_amount == 264
                    && insert.status == "requires_authorization"
            })
            .times(1)
            .returning(move |_| Ok(row.clone()));

        let usecase = ports.into_usecase();
        let dto = usecase
            .create_intent(
                guest,
                CreateIntentModel {
                    booking_id: booking.id,
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.id, created.id);
        assert_eq!(dto.amount_total, 381);
        assert_eq!(dto.status, PaymentStatus::RequiresAuthorization);
    }

    #[tokio::test]
    async fn repeated_intents_return_the_same_payment() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let mut ports = Ports::new();

        let found_booking = booking.clone();
        ports
            .bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found_booking.clone())));
        let found_listing = listing_row.clone();
        ports
            .listings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found_listing.clone())));

        let winner = payment_row(&booking, host, PaymentStatus::RequiresAuthorization);
        let row = winner.clone();
        ports
            .payments
            .expect_create_if_absent()
            .times(2)
            .returning(move |_| Ok(row.clone()));

        let usecase = ports.into_usecase();
        let first = usecase
            .create_intent(
                guest,
                CreateIntentModel {
                    booking_id: booking.id,
                },
            )
            .await
            .unwrap();
        let second = usecase
            .create_intent(
                guest,
                CreateIntentModel {
                    booking_id: booking.id,
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.amount_total, second.amount_total);
    }

    #[tokio::test]
    async fn intent_is_guest_only() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let mut ports = Ports::new();

        let found_booking = booking.clone();
        ports
            .bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found_booking.clone())));

        let usecase = ports.into_usecase();
        let result = usecase
            .create_intent(
                host,
                CreateIntentModel {
                    booking_id: booking.id,
                },
            )
            .await;

        assert!(matches!(result, Err(PaymentError::Forbidden)));
    }

    #[tokio::test]
    async fn intent_requires_awaiting_payment_status() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let mut booking = awaiting_payment_booking(&listing_row, guest);
        booking.status = BookingStatus::Pending.to_string();
        let mut ports = Ports::new();

        let found_booking = booking.clone();
        ports
            .bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found_booking.clone())));

        let usecase = ports.into_usecase();
        let result = usecase
            .create_intent(
                guest,
                CreateIntentModel {
                    booking_id: booking.id,
                },
            )
            .await;

        assert!(matches!(result, Err(PaymentError::Forbidden)));
    }

    #[tokio::test]
    async fn intent_for_an_unknown_booking_is_not_found() {
        let mut ports = Ports::new();
        ports.bookings.expect_find_by_id().returning(|_| Ok(None));

        let usecase = ports.into_usecase();
        let result = usecase
            .create_intent(
                Uuid::new_v4(),
                CreateIntentModel {
                    booking_id: Uuid::new_v4(),
                },
            )
            .await;

        assert!(matches!(result, Err(PaymentError::BookingNotFound)));
    }

    #[tokio::test]
    async fn authorize_captures_and_confirms_the_booking() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let pending_payment = payment_row(&booking, host, PaymentStatus::RequiresAuthorization);
        let mut ports = Ports::new();

        let found = pending_payment.clone();
        ports
            .payments
            .expect_find_by_id()
            .with(eq(pending_payment.id))
            .returning(move |_| Ok(Some(found.clone())));

        let mut captured = pending_payment.clone();
        captured.status = PaymentStatus::Captured.to_string();
        captured.authorized_at = Some(fixed_now());
        captured.captured_at = Some(fixed_now());
        let mut confirmed = booking.clone();
        confirmed.status = BookingStatus::Confirmed.to_string();
        confirmed.paid_at = Some(fixed_now());

        let outcome_payment = captured.clone();
        let outcome_booking = confirmed.clone();
        ports
            .payments
            .expect_authorize_and_capture()
            .with(eq(pending_payment.id), eq(fixed_now()))
            .times(1)
            .returning(move |_, _| {
                Ok(SettlementOutcome::Captured {
                    payment: outcome_payment.clone(),
                    booking: outcome_booking.clone(),
                })
            });

        ports
            .cohosts
            .expect_list_editor_ids()
            .returning(|_| Ok(Vec::new()));
        ports
            .notifier
            .expect_notify()
            .withf(move |event, recipients| {
                matches!(event, BookingEvent::PaymentCaptured { .. })
                    && recipients == &[guest, host]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = ports.into_usecase();
        let dto = usecase.authorize(guest, pending_payment.id).await.unwrap();

        assert_eq!(dto.status, PaymentStatus::Captured);
        assert_eq!(dto.captured_at, Some(fixed_now()));
    }

    #[tokio::test]
    async fn authorize_is_a_noop_for_a_captured_payment() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let captured = payment_row(&booking, host, PaymentStatus::Captured);
        let mut ports = Ports::new();

        let found = captured.clone();
        ports
            .payments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        // No settlement call and no event.
        let usecase = ports.into_usecase();
        let dto = usecase.authorize(guest, captured.id).await.unwrap();

        assert_eq!(dto.id, captured.id);
        assert_eq!(dto.status, PaymentStatus::Captured);
    }

    #[tokio::test]
    async fn authorize_retries_a_failed_payment() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let failed = payment_row(&booking, host, PaymentStatus::Failed);
        let mut ports = Ports::new();

        let found = failed.clone();
        ports
            .payments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut captured = failed.clone();
        captured.status = PaymentStatus::Captured.to_string();
        let mut confirmed = booking.clone();
        confirmed.status = BookingStatus::Confirmed.to_string();
        let outcome_payment = captured.clone();
        let outcome_booking = confirmed.clone();
        ports
            .payments
            .expect_authorize_and_capture()
            .times(1)
            .returning(move |_, _| {
                Ok(SettlementOutcome::Captured {
                    payment: outcome_payment.clone(),
                    booking: outcome_booking.clone(),
                })
            });
        ports
            .cohosts
            .expect_list_editor_ids()
            .returning(|_| Ok(Vec::new()));
        ports.notifier.expect_notify().returning(|_, _| Ok(()));

        let usecase = ports.into_usecase();
        let dto = usecase.authorize(guest, failed.id).await.unwrap();

        assert_eq!(dto.status, PaymentStatus::Captured);
    }

    #[tokio::test]
    async fn authorize_is_guest_only() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let pending_payment = payment_row(&booking, host, PaymentStatus::RequiresAuthorization);
        let mut ports = Ports::new();

        let found = pending_payment.clone();
        ports
            .payments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let usecase = ports.into_usecase();
        let result = usecase.authorize(host, pending_payment.id).await;

        assert!(matches!(result, Err(PaymentError::Forbidden)));
    }

    #[tokio::test]
    async fn a_lost_capture_race_surfaces_as_a_conflict() {
        let host = Uuid::new_v4();
        let guest = Uuid::new_v4();
        let listing_row = listing(host);
        let booking = awaiting_payment_booking(&listing_row, guest);
        let pending_payment = payment_row(&booking, host, PaymentStatus::RequiresAuthorization);
        let mut ports = Ports::new();

        let found = pending_payment.clone();
        ports
            .payments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut failed = pending_payment.clone();
        failed.status = PaymentStatus::Failed.to_string();
        let outcome_payment = failed.clone();
        ports
            .payments
            .expect_authorize_and_capture()
            .returning(move |_, _| Ok(SettlementOutcome::Conflict(outcome_payment.clone())));

        // No captured event on a lost race.
        let usecase = ports.into_usecase();
        let result = usecase.authorize(guest, pending_payment.id).await;

        assert!(matches!(result, Err(PaymentError::DatesUnavailable)));
    }

    #[tokio::test]
    async fn authorize_for_an_unknown_payment_is_not_found() {
        let mut ports = Ports::new();
        ports.payments.expect_find_by_id().returning(|_| Ok(None));

        let usecase = ports.into_usecase();
        let result = usecase.authorize(Uuid::new_v4(), Uuid::new_v4()).await;

        assert!(matches!(result, Err(PaymentError::PaymentNotFound)));
    }
}
