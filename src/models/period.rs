use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Truncate a timestamp to its calendar day (UTC), the atomic unit for
/// streak and bucketing logic.
pub fn day_key(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Inclusive calendar-day window for period reporting.
///
/// Fields are private so a window with `start > end` is unrepresentable;
/// `new` rejects it before any bucketing work can begin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl PeriodWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every day in the window, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }

    /// First instant of the window, UTC midnight of `start`.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the window, UTC midnight of the day after `end`.
    pub fn end_instant_exclusive(&self) -> DateTime<Utc> {
        match self.end.succ_opt() {
            Some(next) => next.and_time(NaiveTime::MIN).and_utc(),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }
}
