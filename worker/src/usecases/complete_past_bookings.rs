use anyhow::Result;
use crates::domain::{clock::Clock, repositories::bookings::BookingRepository};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct CompletePastBookingsResult {
    pub completed: usize,
    pub booking_ids: Vec<Uuid>,
}

/// Closes out confirmed stays whose checkout date has passed. One bulk
/// update; running it again finds nothing, so overlapping sweeps are safe.
pub struct CompletePastBookingsUseCase {
    repository: Arc<dyn BookingRepository + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl CompletePastBookingsUseCase {
    pub fn new(
        repository: Arc<dyn BookingRepository + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self { repository, clock }
    }

    pub async fn run(&self) -> Result<CompletePastBookingsResult> {
        let today = self.clock.today();
        let now = self.clock.now();

        let booking_ids = self.repository.complete_past_bookings(today, now).await?;

        let result = CompletePastBookingsResult {
            completed: booking_ids.len(),
            booking_ids,
        };

        info!(
            completed = result.completed,
            %today,
            "complete_past_bookings: sweep finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use crates::domain::{clock::MockClock, repositories::bookings::MockBookingRepository};
    use mockall::predicate::eq;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 0, 30, 0).unwrap()
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().returning(fixed_now);
        clock.expect_today().returning(fixed_today);
        clock
    }

    #[tokio::test]
    async fn sweep_passes_the_injected_dates_and_reports_the_transitions() {
        let swept = vec![Uuid::new_v4(), Uuid::new_v4()];
        let mut repository = MockBookingRepository::new();
        let returned = swept.clone();
        repository
            .expect_complete_past_bookings()
            .with(eq(fixed_today()), eq(fixed_now()))
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));

        let usecase =
            CompletePastBookingsUseCase::new(Arc::new(repository), Arc::new(clock()));
        let result = usecase.run().await.unwrap();

        assert_eq!(result.completed, 2);
        assert_eq!(result.booking_ids, swept);
    }

    #[tokio::test]
    async fn a_second_sweep_finds_nothing_to_do() {
        let mut repository = MockBookingRepository::new();
        let mut pass = 0;
        repository
            .expect_complete_past_bookings()
            .times(2)
            .returning(move |_, _| {
                pass += 1;
                if pass == 1 {
                    Ok(vec![Uuid::new_v4()])
                } else {
                    Ok(Vec::new())
                }
            });

        let usecase =
            CompletePastBookingsUseCase::new(Arc::new(repository), Arc::new(clock()));

        assert_eq!(usecase.run().await.unwrap().completed, 1);
        assert_eq!(usecase.run().await.unwrap().completed, 0);
    }
}
