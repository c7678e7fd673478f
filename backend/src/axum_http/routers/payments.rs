use crate::{
    auth::AuthUser,
    axum_http::error_responses::error_response,
    config::config_model::DotEnvyConfig,
    usecases::payments::{CreateIntentModel, PaymentError, PaymentUseCase},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
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
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let payment_repository = PaymentPostgres::new(Arc::clone(&db_pool));
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let listing_repository = ListingPostgres::new(Arc::clone(&db_pool));
    let cohost_repository = CohostPostgres::new(Arc::clone(&db_pool));

    let payment_usecase = PaymentUseCase::new(
        Arc::new(payment_repository),
        Arc::new(booking_repository),
        Arc::new(listing_repository),
        Arc::new(cohost_repository),
        Arc::new(LogNotificationGateway),
        Arc::new(SystemClock),
        config.payment_rates,
    );

    Router::new()
        .route("/intent", post(intent))
        .route("/:payment_id/authorize", post(authorize))
        .with_state(Arc::new(payment_usecase))
}

fn respond_err(err: PaymentError) -> Response {
    error_response(err.status_code(), err.to_string())
}

pub async fn intent<P, B, L, C, N, K>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, B, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
    Json(create_intent_model): Json<CreateIntentModel>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match payment_usecase
        .create_intent(user_id, create_intent_model)
        .await
    {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(err) => respond_err(err),
    }
}

pub async fn authorize<P, B, L, C, N, K>(
    State(payment_usecase): State<Arc<PaymentUseCase<P, B, L, C, N, K>>>,
    AuthUser { user_id }: AuthUser,
    Path(payment_id): Path<Uuid>,
) -> impl IntoResponse
where
    P: PaymentRepository + Send + Sync + 'static,
    B: BookingRepository + Send + Sync + 'static,
    L: ListingRepository + Send + Sync + 'static,
    C: CohostRepository + Send + Sync + 'static,
    N: NotificationGateway + Send + Sync + 'static,
    K: Clock + Send + Sync + 'static,
{
    match payment_usecase.authorize(user_id, payment_id).await {
        Ok(payment) => Json(payment).into_response(),
        Err(err) => respond_err(err),
    }
}
