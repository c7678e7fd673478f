use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    usecases::bookings::{BookingError, BookingUseCase, CreateBookingModel},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use crates::{
    domain::{
        clock::{Clock, SystemClock},
        repositories::{
            bookings::BookingRepository, cohosts::CohostRepository, listings::ListingRepository,
            notifications::NotificationGateway, payments::PaymentRepository,
        },
    },
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                bookings::BookingPostgres, cohosts::CohostPostgres, listings::ListingPostgres,
                payments::PaymentPostgres,
            },
        },
        notifications::log_gateway::LogNotificationGateway,
    },
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let listing_repository = ListingPostgres::new(Arc::clone(&db_pool));
    let cohost_repository = CohostPostgres::new(Arc::clone(&db_pool));

    let booking_usecase = BookingUseCase::new(
        Arc::new(booking_repository),
        Arc::new(payment_repository),
        Arc::new(listing_repository),
        Arc::new(cohost_repository),
        Arc::new(LogNotificationGateway),
        Arc::new(SystemClock),
    );

    Router::new()
        .route("/", get(index).post(store))
        .route("/active-count", get(active_count))
        .route("/:booking_id", get(show))
        .route("/:booking_id/confirm", patch(confirm))
        .route("/:booking_id/reject", patch(reject))
        .route("/:booking_id/cancel", patch(cancel))
        .route("/listing/:listing_id/confirmed", get(confirmed_for_listing))
        .with_state(Arc::new(booking_usecase))
}

fn respond_err(err: BookingError) -> Response {
    error_response(err.status_code(), err.to_string())
}

pub async fn index<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.list_for_user(user_id).await {
        Ok(bookings) => Json(bookings).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn store<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
    Json(create_booking_model): Json<CreateBookingModel>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.create(user_id, create_booking_model).await {
        Ok(booking) => (StatusCode::CREATED, Json(booking)).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn active_count<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.count_active_for_guest(user_id).await {
        Ok(count) => Json(json!({ "count": count })).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn show<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.find_for_user(user_id, booking_id).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn confirm<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.confirm(user_id, booking_id).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn reject<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.reject(user_id, booking_id).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn cancel<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.cancel(user_id, booking_id).await {
        Ok(booking) => Json(booking).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn confirmed_for_listing<B, P, L, C, N, K>(
    State(booking_usecase): State<Arc<BookingUseCase<B, P, L, C, N, K>>>,
    _auth: AuthUser,
    Path(listing_id): Path<Uuid>,
) -> impl IntoResponse
where
    B: BookingRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match booking_usecase.list_confirmed_for_listing(listing_id).await {
        Ok(bookings) => Json(bookings).into_response(),
        Err(err) => respond_err(err),
    }
}
