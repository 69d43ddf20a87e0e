//! Conversion of points in time into the engine's timestamp format

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// A point in time accepted by [`convert_date`]
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    /// A datetime with a known offset
    DateTime(DateTime<FixedOffset>),
    /// Seconds since the Unix epoch
    Timestamp(i64),
    /// A date string to be parsed
    Text(String),
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        Self::Timestamp(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Format a point in time as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// With `include_timezone` the datetime keeps its own offset and is written
/// as `YYYY-MM-DDTHH:MM:SS+HH:MM`; otherwise it is converted to UTC.
/// Strings without an offset are read as UTC.
pub fn convert_date(input: impl Into<DateInput>, include_timezone: bool) -> Result<String> {
    let datetime = match input.into() {
        DateInput::DateTime(datetime) => datetime,
        DateInput::Timestamp(seconds) => timestamp_to_datetime(seconds)?,
        DateInput::Text(text) => parse_date(&text)?,
    };

    if include_timezone {
        Ok(datetime.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
    } else {
        Ok(datetime
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

fn timestamp_to_datetime(seconds: i64) -> Result<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| Error::InvalidArgument(format!("timestamp out of range: {}", seconds)))
}

fn parse_date(text: &str) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Ok(datetime);
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(seconds) = text.parse::<i64>() {
            return timestamp_to_datetime(seconds);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    Err(Error::InvalidArgument(format!("unparseable date: '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_convert_timestamp() {
        assert_eq!(convert_date(0_i64, false).unwrap(), "1970-01-01T00:00:00Z");
        assert_eq!(
            convert_date(1_700_000_000_i64, false).unwrap(),
            "2023-11-14T22:13:20Z"
        );
        assert_eq!(
            convert_date(1_700_000_000_i64, true).unwrap(),
            "2023-11-14T22:13:20+00:00"
        );
    }

    #[test]
    fn test_convert_datetime_with_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let datetime = offset.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        assert_eq!(
            convert_date(datetime, true).unwrap(),
            "2024-03-01T12:30:00+02:00"
        );
        assert_eq!(convert_date(datetime, false).unwrap(), "2024-03-01T10:30:00Z");
    }

    #[test]
    fn test_convert_strings() {
        assert_eq!(
            convert_date("2024-03-01 08:15:00", false).unwrap(),
            "2024-03-01T08:15:00Z"
        );
        assert_eq!(convert_date("2024-03-01", false).unwrap(), "2024-03-01T00:00:00Z");
        assert_eq!(
            convert_date("2024-03-01T08:15:00-05:00", false).unwrap(),
            "2024-03-01T13:15:00Z"
        );
        assert_eq!(convert_date("86400", false).unwrap(), "1970-01-02T00:00:00Z");
    }

    #[test]
    fn test_unparseable_date() {
        assert!(matches!(
            convert_date("next tuesday", false),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            convert_date(i64::MAX, false),
            Err(Error::InvalidArgument(_))
        ));
    }
}
