use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
}

/// A calendar year, or a calendar month when `month` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bucket {
    year: i32,
    month: Option<u32>,
}

impl Bucket {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// The bucket of `granularity` containing `ts`.
    pub fn of(ts: &NaiveDateTime, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Year => Self::year(ts.year()),
            Granularity::Month => Self::month(ts.year(), ts.month()),
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month {
            Some(month) => write!(f, "{:04}-{:02}", self.year, month),
            None => write!(f, "{:04}", self.year),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Inclusive range of creation timestamps counted by the monthly tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    /// From [`window_start`] of `now` up to `now` itself.
    pub fn trailing_year(now: NaiveDateTime) -> Self {
        Self {
            start: window_start(now),
            end: now,
        }
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Lower bound of the monthly window: 365 days before `now`, moved back to
/// midnight on the first of that month.
pub fn window_start(now: NaiveDateTime) -> NaiveDateTime {
    let date = (now - TimeDelta::days(365)).date();
    let first = date.with_day(1).unwrap_or(date);
    first.and_time(NaiveTime::MIN)
}
