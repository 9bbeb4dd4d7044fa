//! Cell parsers shared by the table readers.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::Error;
use crate::constants::time_format::{DATE_INPUT, UTC_DATE_TIME, UTC_DATE_TIME_INPUT};
use crate::utils::date::parse_utc_offset;

/// Format error for a data row. `index` is the zero-based record index;
/// line numbers count the header as line 1.
pub(crate) fn invalid_row(index: usize, message: impl std::fmt::Display) -> Error {
    Error::InvalidInputFormat {
        message: format!("line {}: {message}", index + 2),
    }
}

/// Parse a timestamp and place it in the given UTC offset.
///
/// `utc` is either a UTC timestamp (`2021-06-01T17:00:00Z`, with or without
/// the `Z`) or an RFC 3339 timestamp with its own offset. A blank `offset`
/// keeps the timestamp's own offset, which is zero for UTC input.
pub(crate) fn parse_timestamp(utc: &str, offset: &str) -> Result<DateTime<FixedOffset>, String> {
    let value = utc.trim();
    let instant = if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        time
    } else {
        let naive = std::iter::once(UTC_DATE_TIME)
            .chain(UTC_DATE_TIME_INPUT.iter().copied())
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .ok_or_else(|| format!("invalid timestamp '{value}'"))?;
        Utc.from_utc_datetime(&naive).fixed_offset()
    };

    if offset.trim().is_empty() {
        return Ok(instant);
    }
    let offset =
        parse_utc_offset(offset).ok_or_else(|| format!("invalid UTC offset '{}'", offset.trim()))?;
    Ok(instant.with_timezone(&offset))
}

/// Parse a calendar date in any accepted format.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    DATE_INPUT
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            // date-time cells from spreadsheets exported to CSV
            value
                .split(['T', ' '])
                .next()
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        })
        .ok_or_else(|| format!("invalid date '{value}'"))
}

/// Parse a date where a blank cell means none.
pub(crate) fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, String> {
    if value.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(value).map(Some)
    }
}

/// Parse an enum or flag cell; blank cells parse to the default value.
pub(crate) fn parse_field<T>(value: &str) -> Result<T, String>
where
    T: FromStr<Err = String>,
{
    value.trim().parse()
}
