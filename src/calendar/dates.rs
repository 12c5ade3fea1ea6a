//! UTC calendar-date helpers.
//!
//! All care dates are bare `YYYY-MM-DD` calendar dates. No timezone
//! conversion happens anywhere in this crate.

use chrono::{Datelike, NaiveDate, Utc};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string into a calendar date.
///
/// Returns `None` for anything that is not a real date in that exact form,
/// including out-of-range days such as `2024-02-30`.
pub fn parse_date_only(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let well_formed = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date_only(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whole days from `start` to `end` (negative if `end` is earlier).
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

/// Number of days in the given month (1-based).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Months since year zero, so consecutive months differ by one.
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Inverse of [`month_index`]: `(year, month)` with 1-based month.
pub fn year_month(index: i64) -> (i32, u32) {
    let year = index.div_euclid(12);
    let month0 = index.rem_euclid(12);
    (year as i32, month0 as u32 + 1)
}
