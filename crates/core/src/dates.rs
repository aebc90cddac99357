//! Calendar formatting helpers.
//!
//! Reports bucket data by calendar day, so every formatter here works on the
//! *local* calendar fields of a timestamp. Converting to UTC first would move
//! late-evening timestamps onto the next day for users west of Greenwich.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{DomainError, DomainResult};

const DATE_FORMAT: &str = "%Y-%m-%d";
const EXTENDED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format `date` as `YYYY-MM-DD` using the calendar of `tz`.
pub fn format_in<Tz, Z>(date: &DateTime<Tz>, tz: &Z) -> String
where
    Tz: TimeZone,
    Z: TimeZone,
    Z::Offset: core::fmt::Display,
{
    date.with_timezone(tz).format(DATE_FORMAT).to_string()
}

/// Format `date` as `YYYY-MM-DD` using the machine's local calendar.
pub fn format_local<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    format_in(date, &Local)
}

/// Format a calendar date that carries no time or zone.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a date string and format it as a local `YYYY-MM-DD`.
///
/// Accepted inputs:
/// - RFC 3339 (`2024-12-31T23:30:00-05:00`), converted to the local zone
/// - a zone-less `YYYY-MM-DDTHH:MM:SS`, read as local wall-clock time
/// - a bare `YYYY-MM-DD`, returned as the same calendar day
pub fn format_local_str(input: &str) -> DomainResult<String> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(format_local(&dt));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, EXTENDED_FORMAT) {
        return Ok(format_date(naive.date()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(format_date(date));
    }

    Err(DomainError::validation(format!("unrecognised date '{input}'")))
}

/// Today's local calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    format_local(&Local::now())
}

/// `YYYY-MM-DDTHH:MM:SS` in the calendar of `tz`.
///
/// No offset suffix and no fractional seconds: this is a display string and
/// must not be fed back into anything expecting RFC 3339.
pub fn to_extended_string_in<Tz, Z>(date: &DateTime<Tz>, tz: &Z) -> String
where
    Tz: TimeZone,
    Z: TimeZone,
    Z::Offset: core::fmt::Display,
{
    date.with_timezone(tz).format(EXTENDED_FORMAT).to_string()
}

/// Local-time variant of [`to_extended_string_in`].
pub fn to_local_extended_string<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    to_extended_string_in(date, &Local)
}

/// First and last calendar day of `year`/`month`.
pub fn month_bounds(year: i32, month: u32) -> DomainResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DomainError::validation(format!("invalid month {year}-{month}")))?;

    let (next_year, next_month) = if first.month() == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| DomainError::validation(format!("month {year}-{month} out of range")))?;

    Ok((first, last))
}
