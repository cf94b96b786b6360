//! Calendar-month keys and period expansion helpers.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::event::TimePeriod;

/// A calendar month, ordered chronologically and rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month, the bucket anchor for projections.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month key holds a valid year/month pair")
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Human-readable label, e.g. `January 2025`.
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error produced when a `YYYY-MM` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError(pub String);

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month key `{}` (expected YYYY-MM)", self.0)
    }
}

impl std::error::Error for ParseMonthError {}

impl FromStr for MonthKey {
    type Err = ParseMonthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError(value.to_string());
        let (year, month) = value.split_once('-').ok_or_else(err)?;
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Expands an inclusive period into the calendar months it spans.
///
/// Buckets are anchored at the first day of each month; the last bucket is
/// the month containing `end`. Inverted periods expand to nothing.
pub fn months_in_period(period: &TimePeriod) -> Vec<MonthKey> {
    if period.is_inverted() {
        return Vec::new();
    }
    let mut months = Vec::new();
    let mut current = MonthKey::from_date(period.start);
    let last = MonthKey::from_date(period.end);
    while current <= last {
        months.push(current);
        current = current.next();
    }
    months
}
