use chrono::{NaiveDate, Utc};

/// Source of "today" for pre-checking elapsed days.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The current UTC calendar day.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always reports the same day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
