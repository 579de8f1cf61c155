//! Log analytics shown next to a habit: intervals, monthly counts and a
//! bundled summary of the streak engine's figures.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::consistency::consistency_rate;
use crate::error::Result;
use crate::habit::HabitRecord;
use crate::streak::longest_streak_and_breaks;

/// Gaps in days between consecutive dates after sorting.
fn gaps(dates: &[NaiveDate]) -> Vec<i64> {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect()
}

/// Mean gap between consecutive dates, rounded half to even. Input order
/// does not matter; fewer than two dates yield 0.
pub fn average_interval_days(dates: &[NaiveDate]) -> i64 {
    let gaps = gaps(dates);
    if gaps.is_empty() {
        return 0;
    }
    let mean = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
    mean.round_ties_even() as i64
}

pub fn count_in_month(dates: &[NaiveDate], year: i32, month: u32) -> usize {
    dates
        .iter()
        .filter(|date| date.year() == year && date.month() == month)
        .count()
}

/// Longest gap between consecutive dates; 0 for fewer than two dates.
pub fn longest_gap_days(dates: &[NaiveDate]) -> i64 {
    gaps(dates).into_iter().max().unwrap_or(0)
}

/// Signed days from `as_of` to `target`; negative once `target` has passed.
pub fn days_until(target: NaiveDate, as_of: NaiveDate) -> i64 {
    (target - as_of).num_days()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HabitSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_breaks: u32,
    pub consistency_rate: f64,
    pub average_interval_days: i64,
    pub performed_this_month: usize,
    pub longest_gap_days: i64,
    pub next_due_date: NaiveDate,
    pub days_until_due: i64,
}

impl HabitSummary {
    pub fn for_habit(habit: &HabitRecord, as_of: NaiveDate) -> Result<Self> {
        let logs = habit.logs();
        let (longest_streak, streak_breaks) =
            longest_streak_and_breaks(logs, habit.frequency(), as_of)?;
        Ok(Self {
            current_streak: habit.streak(),
            longest_streak,
            streak_breaks,
            consistency_rate: consistency_rate(logs, habit.frequency(), as_of)?,
            average_interval_days: average_interval_days(logs),
            performed_this_month: count_in_month(logs, as_of.year(), as_of.month()),
            longest_gap_days: longest_gap_days(logs),
            next_due_date: habit.next_due_date(),
            days_until_due: days_until(habit.next_due_date(), as_of),
        })
    }
}
