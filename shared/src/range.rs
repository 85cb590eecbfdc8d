//! Query date range
//!
//! The ERP endpoints answer slowly for long periods, so a range is capped at
//! [`MAX_RANGE_DAYS`] and validated before any request is made.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest span (end - start, in days) a single query may cover
pub const MAX_RANGE_DAYS: i64 = 95;

/// Compact date form used in ERP filter literals
const COMPACT_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("End date {end} is before start date {start}")]
    Inverted { start: NaiveDate, end: NaiveDate },

    #[error("Range of {days} days exceeds the maximum of {max} days")]
    TooLong { days: i64, max: i64 },
}

/// Inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Inverted { start, end });
        }
        let days = (end - start).num_days();
        if days > MAX_RANGE_DAYS {
            return Err(RangeError::TooLong {
                days,
                max: MAX_RANGE_DAYS,
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two ISO dates (`YYYY-MM-DD`)
    pub fn parse(start: &str, end: &str) -> Result<Self, RangeError> {
        Self::new(parse_iso(start)?, parse_iso(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days between start and end
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Start date as `YYYYMMDD`
    pub fn compact_start(&self) -> String {
        self.start.format(COMPACT_FORMAT).to_string()
    }

    /// End date as `YYYYMMDD`
    pub fn compact_end(&self) -> String {
        self.end.format(COMPACT_FORMAT).to_string()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

fn parse_iso(value: &str) -> Result<NaiveDate, RangeError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| RangeError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compact_rendering() {
        let range = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert_eq!(range.compact_start(), "20240301");
        assert_eq!(range.compact_end(), "20240331");
        assert_eq!(range.days(), 30);
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::parse("2024-06-10", "2024-06-10").unwrap();
        assert_eq!(range.days(), 0);
    }

    #[test]
    fn test_inverted_range() {
        let err = DateRange::parse("2024-03-10", "2024-03-01").unwrap_err();
        assert!(matches!(err, RangeError::Inverted { .. }));
    }

    #[test]
    fn test_range_limit() {
        // 95 days is the last accepted span
        assert!(DateRange::new(date(2024, 1, 1), date(2024, 4, 5)).is_ok());
        let err = DateRange::new(date(2024, 1, 1), date(2024, 4, 6)).unwrap_err();
        assert_eq!(err, RangeError::TooLong { days: 96, max: 95 });
    }

    #[test]
    fn test_invalid_date() {
        let err = DateRange::parse("2024-02-30", "2024-03-01").unwrap_err();
        assert_eq!(err, RangeError::InvalidDate("2024-02-30".into()));
        assert!(DateRange::parse("20240301", "2024-03-02").is_err());
    }
}
