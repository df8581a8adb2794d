//! Deterministic clock for date-stamping assertions.

use chrono::{DateTime, Local, NaiveDate, Utc};
use mockable::Clock;

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Freeze at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// Freeze at midday UTC on the given date.
    ///
    /// # Panics
    /// Panics when the date is not a valid calendar date.
    #[must_use]
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        let Some(noon) = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
        else {
            panic!("invalid fixture date {year}-{month}-{day}");
        };
        Self(noon.and_utc())
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
