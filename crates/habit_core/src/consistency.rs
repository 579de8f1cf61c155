use chrono::NaiveDate;

use crate::error::Result;
use crate::frequency::Frequency;
use crate::streak::longest_streak_and_breaks;

/// Percentage (0..=100) of tracked entries counted as successful.
///
/// An entry counts when the habit ever held a streak longer than one; the
/// first `breaks` entries are discounted. The figure is tied to the break
/// count rather than to which entries were actually in a run.
pub fn consistency_rate(logs: &[NaiveDate], frequency: &Frequency, as_of: NaiveDate) -> Result<f64> {
    let tracked = logs.len();
    match tracked {
        0 => return Ok(0.0),
        1 => return Ok(100.0),
        _ => {}
    }

    let (longest, breaks) = longest_streak_and_breaks(logs, frequency, as_of)?;
    let successful = (breaks as usize..tracked).filter(|_| longest > 1).count();
    Ok(successful as f64 / tracked as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date;

    fn rate(raw: &[&str], frequency: &str) -> f64 {
        let logs: Vec<NaiveDate> = raw.iter().map(|d| parse_date(d).unwrap()).collect();
        let frequency = Frequency::parse(frequency).unwrap();
        consistency_rate(&logs, &frequency, parse_date("2024-06-01").unwrap()).unwrap()
    }

    #[test]
    fn empty_and_single_logs() {
        assert_eq!(rate(&[], "Daily"), 0.0);
        assert_eq!(rate(&["2024-01-01"], "Daily"), 100.0);
    }

    #[test]
    fn daily_with_one_break() {
        let logs = ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-05"];
        assert_eq!(rate(&logs, "Daily"), 75.0);
    }

    #[test]
    fn weekly_with_one_break() {
        let logs = [
            "2024-01-01",
            "2024-01-08",
            "2024-01-15",
            "2024-01-22",
            "2024-02-05",
        ];
        assert_eq!(rate(&logs, "Weekly"), 80.0);
    }

    #[test]
    fn all_pairs_broken_scores_zero() {
        assert_eq!(rate(&["2024-01-01", "2024-01-05", "2024-01-10"], "Daily"), 0.0);
    }

    #[test]
    fn unbroken_log_scores_full() {
        assert_eq!(rate(&["2024-01-01", "2024-02-15", "2024-03-31"], "Monthly"), 100.0);
    }
}
