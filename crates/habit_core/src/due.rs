use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, error, warn};

use crate::error::{HabitError, Result};
use crate::frequency::{weekday_name, Frequency};
use crate::range::in_range;

/// Candidates scanned for `Weekly`: one ISO week plus the year-wrap slack.
const WEEKLY_HORIZON: u64 = 15;
/// Candidates scanned for `Monthly`: two consecutive 31-day months.
const MONTHLY_HORIZON: u64 = 63;

/// Next date on which a habit last performed on `last_performed` is due.
pub fn next_due(last_performed: NaiveDate, frequency: &Frequency) -> Result<NaiveDate> {
    let due = match frequency {
        Frequency::Daily => add_days(last_performed, 1)?,
        Frequency::EveryNDays(days) => add_days(last_performed, u64::from(*days))?,
        Frequency::EveryWeekday(day) => next_weekday(last_performed, *day)?,
        Frequency::Weekly => last_in_range(last_performed, frequency, WEEKLY_HORIZON)?,
        Frequency::Monthly => last_in_range(last_performed, frequency, MONTHLY_HORIZON)?,
    };
    debug!(%last_performed, %frequency, %due, "computed next due date");
    Ok(due)
}

/// `date + days`, failing instead of panicking past chrono's calendar range.
fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days)).ok_or_else(|| {
        warn!(%date, days, "due date outside the supported calendar range");
        HabitError::DateOutOfRange(format!("{date} + {days} days"))
    })
}

fn next_weekday(last_performed: NaiveDate, day: chrono::Weekday) -> Result<NaiveDate> {
    for offset in 1..=7 {
        let candidate = add_days(last_performed, offset)?;
        if candidate.weekday() == day {
            return Ok(candidate);
        }
    }
    error!(%last_performed, weekday = weekday_name(day), "no matching weekday within a week");
    Err(HabitError::Internal(format!(
        "no {} within seven days of {last_performed}",
        weekday_name(day)
    )))
}

/// Walk forward from `last_performed` and return the last candidate that is
/// still adjacent under `frequency`. This follows month lengths and leap
/// years instead of assuming a fixed interval.
fn last_in_range(last_performed: NaiveDate, frequency: &Frequency, horizon: u64) -> Result<NaiveDate> {
    let mut last_true = None;
    let mut exhausted = true;
    for offset in 0..horizon {
        let candidate = add_days(last_performed, offset)?;
        if in_range(candidate, last_performed, frequency, None, last_performed)? {
            last_true = Some(candidate);
        } else {
            exhausted = false;
            break;
        }
    }
    if exhausted {
        warn!(
            %last_performed,
            %frequency,
            horizon,
            "scan horizon exhausted before the rule failed"
        );
    }
    last_true.ok_or_else(|| {
        HabitError::Internal(format!(
            "{frequency} rejected {last_performed} against itself"
        ))
    })
}
