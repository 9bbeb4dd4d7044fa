//! Calendar and UTC offset helpers.

use chrono::{Datelike, FixedOffset, NaiveDate, TimeDelta};

use crate::constants::calendar::MONTH_ABBREVIATIONS;

/// Seconds in an hour, for UTC offset conversion.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Number of days in `month` (1-12) of `year`, accounting for leap years.
///
/// Returns `None` if the month is out of range.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let days = (next - first).num_days() as u32;
    Some(days)
}

/// Label for a diel activity bucket: the midpoint of the hour, e.g. `06:30`.
pub fn hour_label(hour: usize) -> String {
    format!("{hour:02}:30")
}

/// Three letter label for a zero-based month index.
pub fn month_label(month0: usize) -> &'static str {
    MONTH_ABBREVIATIONS.get(month0).copied().unwrap_or("???")
}

/// Format a duration as `h:mm:ss`, with a leading `d.` for spans of a day or more.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.unsigned_abs();

    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{sign}{days}.{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// Format a UTC offset as decimal hours, e.g. `-8` or `5.5`.
pub fn format_utc_offset(offset: FixedOffset) -> String {
    let hours = f64::from(offset.local_minus_utc()) / SECONDS_PER_HOUR;
    format!("{hours}")
}

/// Parse a UTC offset.
///
/// Accepts decimal hours (`-8`, `5.5`), `±HH:MM` (`-08:00`, `+05:30`),
/// and `Z`/`UTC` for zero.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    if let Some((hours, minutes)) = value.split_once(':') {
        let negative = hours.starts_with('-');
        let hours: i32 = hours.trim_start_matches(['+', '-']).parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;
        if !(0..60).contains(&minutes) {
            return None;
        }
        let seconds = hours * 3600 + minutes * 60;
        return FixedOffset::east_opt(if negative { -seconds } else { seconds });
    }

    let hours: f64 = value.parse().ok()?;
    if !hours.is_finite() {
        return None;
    }

    #[allow(clippy::cast_possible_truncation)]
    let seconds = (hours * SECONDS_PER_HOUR).round() as i32;
    FixedOffset::east_opt(seconds)
}

/// Today's date in UTC.
pub fn utc_today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Whether `date` falls in `month` (1-12) of `year`.
pub fn is_in_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}
