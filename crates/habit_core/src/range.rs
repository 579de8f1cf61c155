use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::dates::month_index;
use crate::error::{HabitError, Result};
use crate::frequency::Frequency;

/// Decide whether `curr` follows `prev` closely enough to keep a streak alive.
///
/// `strict` only matters for [`Frequency::EveryNDays`], where it must be
/// supplied: strict requires exactly `n` days, lenient accepts up to `n`.
///
/// For [`Frequency::EveryWeekday`] the weekday test is made against `as_of`
/// (the evaluation date), not against `curr`. This matches the behavior
/// existing save files were scored with and is a known inconsistency.
pub fn in_range(
    curr: NaiveDate,
    prev: NaiveDate,
    frequency: &Frequency,
    strict: Option<bool>,
    as_of: NaiveDate,
) -> Result<bool> {
    let delta_days = (curr - prev).num_days();
    let verdict = match frequency {
        Frequency::Daily => delta_days.abs() == 1,
        Frequency::Weekly => {
            let curr_week = curr.iso_week().week() as i64;
            let prev_week = prev.iso_week().week() as i64;
            // Two entries in the same week are fine; the last week of a
            // 53-week year never breaks a streak.
            curr_week - prev_week <= 1 || (curr_week == 1 && matches!(prev_week, 52 | 53))
        }
        Frequency::Monthly => month_index(curr) - month_index(prev) <= 1,
        Frequency::EveryNDays(days) => {
            let strict =
                strict.ok_or_else(|| HabitError::MissingStrictFlag(frequency.to_string()))?;
            if strict {
                delta_days == i64::from(*days)
            } else {
                delta_days <= i64::from(*days)
            }
        }
        Frequency::EveryWeekday(day) => delta_days <= 7 && as_of.weekday() == *day,
    };
    debug!(%curr, %prev, %frequency, verdict, "checked adjacency");
    Ok(verdict)
}
