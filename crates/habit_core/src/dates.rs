use chrono::NaiveDate;

use crate::error::{HabitError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a calendar date in the persisted `YYYY-MM-DD` form.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| HabitError::InvalidDateFormat(input.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Absolute month index used by the monthly adjacency rule.
pub(crate) fn month_index(date: NaiveDate) -> i64 {
    use chrono::Datelike;
    i64::from(date.year()) * 12 + i64::from(date.month())
}
