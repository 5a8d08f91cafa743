//! Timestamp codec
//!
//! Record timestamps are RFC 3339 strings with an explicit UTC offset.
//! Ordering and equality are by absolute instant, so `12:00:00+07:00` and
//! `05:00:00Z` compare equal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a valid RFC 3339 timestamp
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid RFC 3339 timestamp {input:?}: {message}")]
pub struct TimestampError {
    /// The rejected input
    pub input: String,
    /// Parser message
    pub message: String,
}

/// An offset-aware instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Parse an RFC 3339 timestamp such as `2023-12-30T19:08:18+07:00`
    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        DateTime::parse_from_rfc3339(input.trim())
            .map(Self)
            .map_err(|e| TimestampError {
                input: input.to_string(),
                message: e.to_string(),
            })
    }

    /// The underlying offset-aware value
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }

    /// The same instant in UTC
    pub fn to_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// RFC 3339 text, keeping the original offset
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Self(datetime)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_offset() {
        let ts = Timestamp::parse("2023-12-30T19:08:18+07:00").unwrap();
        assert_eq!(ts.to_string(), "2023-12-30T19:08:18+07:00");
        assert_eq!(ts.as_datetime().offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_equality_is_by_instant() {
        let jakarta = Timestamp::parse("2024-01-01T12:00:03+07:00").unwrap();
        let utc = Timestamp::parse("2024-01-01T05:00:03Z").unwrap();
        assert_eq!(jakarta, utc);
        assert_eq!(jakarta.to_utc(), utc.to_utc());

        let later = Timestamp::parse("2024-01-01T05:00:04Z").unwrap();
        assert!(jakarta < later);
    }

    #[test]
    fn test_utc_renders_with_z() {
        let ts = Timestamp::parse("2024-02-08T04:36:49Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-02-08T04:36:49Z");
    }

    #[test]
    fn test_rejects_malformed_input() {
        for bad in ["", "2024-01-01", "2024-01-01 12:00:00", "not a date", "2024-13-01T00:00:00Z"] {
            let err = Timestamp::parse(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn test_from_str() {
        let ts: Timestamp = "2024-02-26T03:09:29+07:00".parse().unwrap();
        assert_eq!(ts, Timestamp::parse("2024-02-25T20:09:29Z").unwrap());
    }
}
