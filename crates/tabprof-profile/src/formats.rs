//! Date and time formats recognized by the classifier and the cast functions.
//!
//! Classification and casting share these tables so that every value the
//! classifier accepts for a temporal type also casts to a non-NULL value.
//!
//! # Canonical output
//!
//! - Dates: `YYYY-MM-DD`
//! - Times: `HH:MM:SS`, with a fractional part only when present
//! - Datetimes: `YYYY-MM-DD HH:MM:SS`; values with an offset are converted to UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Accepted date layouts, tried in order.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y",
];

/// Accepted time layouts. `%.f` also matches a missing fraction.
pub const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Accepted datetime layouts without an offset. RFC 3339 is tried first.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

pub const CANONICAL_DATE: &str = "%Y-%m-%d";
pub const CANONICAL_TIME: &str = "%H:%M:%S%.f";
pub const CANONICAL_DATETIME: &str = "%Y-%m-%d %H:%M:%S%.f";

/// chrono accepts short years for `%Y`; a date needs a four-digit year part.
fn has_full_year(date: &str) -> bool {
    date.split(['-', '/', '.'])
        .any(|part| part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit()))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !has_full_year(value) {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }
    let date_part = value.split([' ', 'T']).next().unwrap_or_default();
    if !has_full_year(date_part) {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

pub fn canonical_date(value: &str) -> Option<String> {
    parse_date(value).map(|date| date.format(CANONICAL_DATE).to_string())
}

pub fn canonical_time(value: &str) -> Option<String> {
    parse_time(value).map(|time| time.format(CANONICAL_TIME).to_string())
}

pub fn canonical_datetime(value: &str) -> Option<String> {
    parse_datetime(value).map(|datetime| datetime.format(CANONICAL_DATETIME).to_string())
}
