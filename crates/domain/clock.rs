use chrono::{DateTime, NaiveDate, Utc};
use mockall::automock;

/// Time source for every timestamp and "today" decision in the core, so
/// completion sweeps and stamping stay deterministic under test.
#[automock]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
