use std::sync::Arc;

use chrono::NaiveDate;
use crates::domain::{
    clock::Clock,
    entities::{
        bookings::{BookingEntity, InsertBookingEntity},
        listings::ListingEntity,
    },
    repositories::{
        bookings::BookingRepository, cohosts::CohostRepository, listings::ListingRepository,
        notifications::NotificationGateway, payments::PaymentRepository,
    },
    value_objects::{
        bookings::{BookingDetailDto, BookingDto, BookingTransition, CancelOutcome, StayRange},
        enums::booking_statuses::BookingStatus,
        iam::ListingAccess,
        notifications::BookingEvent,
    },
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateBookingModel {
    pub listing_id: Uuid,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("action not allowed")]
    Forbidden,
    #[error("dates are unavailable")]
    DatesUnavailable,
    #[error("listing not found")]
    ListingNotFound,
    #[error("booking not found")]
    BookingNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BookingError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BookingError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            BookingError::Forbidden => StatusCode::FORBIDDEN,
            BookingError::DatesUnavailable => StatusCode::CONFLICT,
            BookingError::ListingNotFound | BookingError::BookingNotFound => StatusCode::NOT_FOUND,
            BookingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, BookingError>;

/// The booking state machine. Every state-changing operation resolves the
/// actor's capability on the listing first, runs its guarded transition
/// through the repository, and fans out events last.
pub struct BookingUseCase<B, P, L, C, N, K>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    payment_repo: Arc<P>,
    listing_repo: Arc<L>,
    cohost_repo: Arc<C>,
    notifier: Arc<N>,
    clock: Arc<K>,
}

impl<B, P, L, C, N, K> BookingUseCase<B, P, L, C, N, K>
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    pub fn new(
        booking_repo: Arc<B>,
        payment_repo: Arc<P>,
        listing_repo: Arc<L>,
        cohost_repo: Arc<C>,
        notifier: Arc<N>,
        clock: Arc<K>,
    ) -> Self {
        Self {
            booking_repo,
            payment_repo,
            listing_repo,
            cohost_repo,
            notifier,
            clock,
        }
    }

    pub async fn create(
        &self,
        actor_id: Uuid,
        model: CreateBookingModel,
    ) -> UseCaseResult<BookingDto> {
        info!(
            %actor_id,
            listing_id = %model.listing_id,
            start_date = %model.start_date,
            end_date = %model.end_date,
            "bookings: create requested"
        );

        let start_date = parse_stay_date("start_date", &model.start_date)?;
        let end_date = parse_stay_date("end_date", &model.end_date)?;
        let range = StayRange::new(start_date, end_date).ok_or_else(|| {
            let err = BookingError::Validation {
                field: "end_date",
                message: "end_date must be after start_date".to_string(),
            };
            warn!(
                %actor_id,
                status = err.status_code().as_u16(),
                "bookings: empty or inverted stay range"
            );
            err
        })?;

        let listing = self.load_listing(model.listing_id).await?;

        let is_cohost = self
            .cohost_repo
            .is_cohost(listing.id, actor_id)
            .await
            .map_err(|err| {
                error!(%actor_id, listing_id = %listing.id, db_error = ?err, "bookings: co-host lookup failed");
                BookingError::Internal(err)
            })?;
        if listing.host_user_id == actor_id || is_cohost {
            let err = BookingError::Forbidden;
            warn!(
                %actor_id,
                listing_id = %listing.id,
                status = err.status_code().as_u16(),
                "bookings: attempt to book own listing"
            );
            return Err(err);
        }

        let conflict = self
            .booking_repo
            .has_conflict(listing.id, range, None)
            .await
            .map_err(|err| {
                error!(listing_id = %listing.id, db_error = ?err, "bookings: availability scan failed");
                BookingError::Internal(err)
            })?;
        if conflict {
            let err = BookingError::DatesUnavailable;
            warn!(
                %actor_id,
                listing_id = %listing.id,
                status = err.status_code().as_u16(),
                "bookings: requested dates clash with a confirmed stay"
            );
            return Err(err);
        }

        let booking = self
            .booking_repo
            .create(InsertBookingEntity {
                listing_id: listing.id,
                guest_user_id: actor_id,
                start_date: range.start(),
                end_date: range.end(),
                status: BookingStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                error!(%actor_id, listing_id = %listing.id, db_error = ?err, "bookings: insert failed");
                BookingError::Internal(err)
            })?;

        let access = self.listing_access(&listing).await?;
        self.dispatch(
            BookingEvent::BookingRequested {
                booking_id: booking.id,
                listing_id: booking.listing_id,
                guest_id: booking.guest_user_id,
                start_date: booking.start_date,
                end_date: booking.end_date,
            },
            access.host_side_recipients(),
        )
        .await;

        info!(booking_id = %booking.id, listing_id = %listing.id, "bookings: booking created");
        Ok(BookingDto::from(booking))
    }

    pub async fn confirm(&self, actor_id: Uuid, booking_id: Uuid) -> UseCaseResult<BookingDto> {
        let booking = self.load_booking(booking_id).await?;
        let listing = self.load_listing(booking.listing_id).await?;
        let access = self.listing_access(&listing).await?;

        if !access.can_manage(actor_id) {
            let err = BookingError::Forbidden;
            warn!(
                %actor_id,
                %booking_id,
                status = err.status_code().as_u16(),
                "bookings: confirm denied"
            );
            return Err(err);
        }

        let transition = self
            .booking_repo
            .confirm_pending(booking.id, self.clock.now())
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: confirm transaction failed");
                BookingError::Internal(err)
            })?;

        match transition {
            BookingTransition::Applied(updated) => {
                self.dispatch(
                    status_changed_event(&updated, false),
                    vec![updated.guest_user_id],
                )
                .await;
                info!(booking_id = %updated.id, "bookings: booking awaits payment");
                Ok(BookingDto::from(updated))
            }
            BookingTransition::NoOp(current) => {
                info!(
                    booking_id = %current.id,
                    current_status = %current.status,
                    "bookings: confirm is a no-op"
                );
                Ok(BookingDto::from(current))
            }
            BookingTransition::Conflict => {
                let err = BookingError::DatesUnavailable;
                warn!(
                    %booking_id,
                    status = err.status_code().as_u16(),
                    "bookings: confirm lost to an overlapping confirmed stay"
                );
                Err(err)
            }
        }
    }

    pub async fn reject(&self, actor_id: Uuid, booking_id: Uuid) -> UseCaseResult<BookingDto> {
        let booking = self.load_booking(booking_id).await?;
        let listing = self.load_listing(booking.listing_id).await?;
        let access = self.listing_access(&listing).await?;

        if !access.can_manage(actor_id) {
            let err = BookingError::Forbidden;
            warn!(
                %actor_id,
                %booking_id,
                status = err.status_code().as_u16(),
                "bookings: reject denied"
            );
            return Err(err);
        }

        // Unlike confirm, reject has no status guard; an authorized host may
        // reject whatever state the booking is in.
        let rejected = self
            .booking_repo
            .mark_rejected(booking.id, self.clock.now())
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: reject write failed");
                BookingError::Internal(err)
            })?;

        self.dispatch(
            status_changed_event(&rejected, false),
            vec![rejected.guest_user_id],
        )
        .await;

        info!(booking_id = %rejected.id, "bookings: booking rejected");
        Ok(BookingDto::from(rejected))
    }

    pub async fn cancel(&self, actor_id: Uuid, booking_id: Uuid) -> UseCaseResult<BookingDto> {
        let booking = self.load_booking(booking_id).await?;
        let listing = self.load_listing(booking.listing_id).await?;
        let access = self.listing_access(&listing).await?;

        let is_guest = booking.guest_user_id == actor_id;
        if !is_guest && !access.can_manage(actor_id) {
            let err = BookingError::Forbidden;
            warn!(
                %actor_id,
                %booking_id,
                status = err.status_code().as_u16(),
                "bookings: cancel denied"
            );
            return Err(err);
        }

        let outcome = self
            .booking_repo
            .cancel_booking(booking.id, self.clock.now())
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: cancel transaction failed");
                BookingError::Internal(err)
            })?;

        let cancelled = match outcome {
            CancelOutcome::NoOp(current) => {
                info!(
                    booking_id = %current.id,
                    current_status = %current.status,
                    "bookings: cancel is a no-op"
                );
                return Ok(BookingDto::from(current));
            }
            CancelOutcome::Cancelled(cancelled) => cancelled,
        };

        let refunded = self
            .payment_repo
            .refund_if_settled(cancelled.id, self.clock.now())
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: refund failed after cancel");
                BookingError::Internal(err)
            })?;

        if let Some(payment) = refunded {
            info!(
                booking_id = %cancelled.id,
                payment_id = %payment.id,
                amount_total = payment.amount_total,
                "bookings: settled payment refunded"
            );
            let mut refund_recipients = vec![payment.guest_user_id];
            refund_recipients.extend(access.host_side_recipients());
            self.dispatch(
                BookingEvent::PaymentRefunded {
                    payment_id: payment.id,
                    booking_id: cancelled.id,
                    amount_total: payment.amount_total,
                },
                refund_recipients,
            )
            .await;
        }

        // The counter-party hears about the cancellation.
        if is_guest {
            self.dispatch(
                status_changed_event(&cancelled, true),
                access.host_side_recipients(),
            )
            .await;
        } else {
            self.dispatch(
                status_changed_event(&cancelled, false),
                vec![cancelled.guest_user_id],
            )
            .await;
        }

        info!(booking_id = %cancelled.id, "bookings: booking cancelled");
        Ok(BookingDto::from(cancelled))
    }

    pub async fn list_for_user(&self, actor_id: Uuid) -> UseCaseResult<Vec<BookingDetailDto>> {
        let records = self
            .booking_repo
            .list_for_user(actor_id)
            .await
            .map_err(|err| {
                error!(%actor_id, db_error = ?err, "bookings: list query failed");
                BookingError::Internal(err)
            })?;

        Ok(records.into_iter().map(BookingDetailDto::from).collect())
    }

    pub async fn find_for_user(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> UseCaseResult<BookingDetailDto> {
        let record = self
            .booking_repo
            .find_detail(booking_id)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: detail query failed");
                BookingError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = BookingError::BookingNotFound;
                warn!(%booking_id, status = err.status_code().as_u16(), "bookings: unknown booking");
                err
            })?;

        if record.booking.guest_user_id != actor_id {
            let err = BookingError::Forbidden;
            warn!(
                %actor_id,
                %booking_id,
                status = err.status_code().as_u16(),
                "bookings: view denied"
            );
            return Err(err);
        }

        Ok(BookingDetailDto::from(record))
    }

    pub async fn list_confirmed_for_listing(
        &self,
        listing_id: Uuid,
    ) -> UseCaseResult<Vec<BookingDto>> {
        let listing = self.load_listing(listing_id).await?;

        let confirmed = self
            .booking_repo
            .list_confirmed_for_listing(listing.id)
            .await
            .map_err(|err| {
                error!(%listing_id, db_error = ?err, "bookings: confirmed list query failed");
                BookingError::Internal(err)
            })?;

        Ok(confirmed.into_iter().map(BookingDto::from).collect())
    }

    pub async fn count_active_for_guest(&self, actor_id: Uuid) -> UseCaseResult<i64> {
        let today = self.clock.today();

        self.booking_repo
            .count_active_for_guest(actor_id, today)
            .await
            .map_err(|err| {
                error!(%actor_id, db_error = ?err, "bookings: active count query failed");
                BookingError::Internal(err)
            })
    }

    async fn load_booking(&self, booking_id: Uuid) -> UseCaseResult<BookingEntity> {
        self.booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: booking lookup failed");
                BookingError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = BookingError::BookingNotFound;
                warn!(%booking_id, status = err.status_code().as_u16(), "bookings: unknown booking");
                err
            })
    }

    async fn load_listing(&self, listing_id: Uuid) -> UseCaseResult<ListingEntity> {
        self.listing_repo
            .find_by_id(listing_id)
            .await
            .map_err(|err| {
                error!(%listing_id, db_error = ?err, "bookings: listing lookup failed");
                BookingError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = BookingError::ListingNotFound;
                warn!(%listing_id, status = err.status_code().as_u16(), "bookings: unknown listing");
                err
            })
    }

    async fn listing_access(&self, listing: &ListingEntity) -> UseCaseResult<ListingAccess> {
        let editor_cohost_ids = self
            .cohost_repo
            .list_editor_ids(listing.id)
            .await
            .map_err(|err| {
                error!(listing_id = %listing.id, db_error = ?err, "bookings: editor lookup failed");
                BookingError::Internal(err)
            })?;

        Ok(ListingAccess {
            host_user_id: listing.host_user_id,
            editor_cohost_ids,
        })
    }

    async fn dispatch(&self, event: BookingEvent, recipients: Vec<Uuid>) {
        if recipients.is_empty() {
            return;
        }
        // Best-effort: a notification failure never fails the transition that
        // fired it.
        if let Err(err) = self.notifier.notify(event, recipients).await {
            warn!(error = ?err, "bookings: notification dispatch failed");
        }
    }
}

fn status_changed_event(booking: &BookingEntity, host_recipient: bool) -> BookingEvent {
    BookingEvent::BookingStatusChanged {
        booking_id: booking.id,
        listing_id: booking.listing_id,
        guest_id: booking.guest_user_id,
        status: BookingStatus::from_str(&booking.status).unwrap_or(BookingStatus::Pending),
        host_recipient,
    }
}

fn parse_stay_date(field: &'static str, value: &str) -> UseCaseResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let err = BookingError::Validation {
            field,
            message: format!("`{value}` is not a valid calendar date"),
        };
        warn!(
            field,
            value,
            status = err.status_code().as_u16(),
            "bookings: date failed to parse"
        );
        err
    })
}
