use crate::usecases::complete_past_bookings::CompletePastBookingsUseCase;
use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

pub async fn run_sweeper_loop(
    usecase: Arc<CompletePastBookingsUseCase>,
    interval: Duration,
) -> Result<()> {
    loop {
        match usecase.run().await {
            Ok(result) if result.completed > 0 => {
                info!(
                    completed = result.completed,
                    booking_ids = ?result.booking_ids,
                    "sweeper: closed out past stays"
                );
            }
            Ok(_) => {}
            Err(e) => error!("Error while completing past bookings: {}", e),
        }

        tokio::time::sleep(interval).await;
    }
}
