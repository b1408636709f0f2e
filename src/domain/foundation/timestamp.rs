//! Timestamp value object wrapping a UTC datetime.

use chrono::{DateTime, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// UTC timestamp used throughout the domain.
///
/// Gateway payloads carry epoch seconds; persistence and the API carry
/// RFC 3339 strings. This wrapper converts between the two without
/// exposing `chrono` at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a UTC datetime.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Creates a timestamp from Unix epoch seconds.
    ///
    /// Returns `None` for values outside the representable range.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Returns the underlying datetime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns Unix epoch seconds.
    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Returns a timestamp `months` calendar months later.
    ///
    /// Day-of-month clamps at the end of shorter months (Jan 31 + 1
    /// month = Feb 28/29).
    pub fn add_months(&self, months: u32) -> Self {
        Self(self.0 + Months::new(months))
    }

    /// Returns a timestamp `years` calendar years later.
    pub fn add_years(&self, years: u32) -> Self {
        Self(self.0 + Months::new(years * 12))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_unix_secs_roundtrips() {
        let ts = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        assert_eq!(ts.as_unix_secs(), 1_700_000_000);
    }

    #[test]
    fn from_unix_secs_rejects_out_of_range() {
        assert!(Timestamp::from_unix_secs(i64::MAX).is_none());
    }

    #[test]
    fn add_months_uses_calendar_arithmetic() {
        // 2024-01-31 + 1 month clamps to Feb 29 (leap year)
        let jan_31 = Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap(),
        );
        let feb = jan_31.add_months(1);
        assert_eq!(
            feb.as_datetime(),
            &Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn add_years_lands_on_same_calendar_date() {
        let start = Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2025, 3, 15, 9, 30, 0).unwrap(),
        );
        let next = start.add_years(1);
        assert_eq!(
            next.as_datetime(),
            &Utc.with_ymd_and_hms(2026, 3, 15, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let ts = Timestamp::from_unix_secs(0).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"1970-01-01T00:00:00Z\"");
    }

    #[test]
    fn display_matches_rfc3339() {
        let ts = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        assert!(ts.to_string().starts_with("2023-11-14T"));
    }
}
