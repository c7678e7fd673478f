use anyhow::Result;
use crates::{
    domain::{clock::SystemClock, repositories::bookings::BookingRepository},
    infra::db::{postgres::postgres_connection, repositories::bookings::BookingPostgres},
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use worker::{
    axum_http, config, services::sweeper_loop, usecases::complete_past_bookings::CompletePastBookingsUseCase,
};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let booking_repository: Arc<dyn BookingRepository + Send + Sync> =
        Arc::new(BookingPostgres::new(Arc::clone(&db_pool_arc)));

    let usecase = Arc::new(CompletePastBookingsUseCase::new(
        booking_repository,
        Arc::new(SystemClock),
    ));

    info!("Worker started");

    let sweep_interval = Duration::from_secs(dotenvy_env.sweep_interval_seconds);
    let sweeper = tokio::spawn(sweeper_loop::run_sweeper_loop(
        Arc::clone(&usecase),
        sweep_interval,
    ));

    let server_port = dotenvy_env.worker_server.port;
    let health_server = tokio::spawn(axum_http::http_serve::start(server_port));

    tokio::select! {
        result = sweeper => result??,
        result = health_server => result??,
    };

    Ok(())
}
