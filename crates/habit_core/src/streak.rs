use chrono::NaiveDate;

use crate::error::Result;
use crate::frequency::Frequency;
use crate::range::in_range;

/// Longest run observed anywhere in `logs` and the number of times a run was
/// broken. Scans forward from the earliest pair; `logs` must be ascending.
pub fn longest_streak_and_breaks(
    logs: &[NaiveDate],
    frequency: &Frequency,
    as_of: NaiveDate,
) -> Result<(u32, u32)> {
    let mut longest = 1;
    let mut running = 1;
    let mut breaks = 0;

    for pair in logs.windows(2) {
        if in_range(pair[1], pair[0], frequency, Some(false), as_of)? {
            running += 1;
        } else {
            breaks += 1;
            running = 1;
        }
        longest = longest.max(running);
    }

    Ok((longest, breaks))
}

/// Trailing streak: how many consecutive qualifying entries end at the most
/// recent log. Walks backward and stops at the first gap.
pub fn current_streak(logs: &[NaiveDate], frequency: &Frequency, as_of: NaiveDate) -> Result<u32> {
    let mut streak = 1;
    for pair in logs.windows(2).rev() {
        if !in_range(pair[1], pair[0], frequency, Some(false), as_of)? {
            break;
        }
        streak += 1;
    }
    Ok(streak)
}
