use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::HabitError;

/// Recurrence rule of a habit.
///
/// Persisted as its grammar string: `Daily`, `Weekly`, `Monthly`,
/// `Every <N> Days` or `Every <Weekday>`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    EveryNDays(u32),
    EveryWeekday(Weekday),
}

impl Frequency {
    pub fn parse(text: &str) -> Result<Self, HabitError> {
        text.parse()
    }
}

impl FromStr for Frequency {
    type Err = HabitError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || HabitError::InvalidFrequency(text.to_string());
        match text {
            "Daily" => return Ok(Frequency::Daily),
            "Weekly" => return Ok(Frequency::Weekly),
            "Monthly" => return Ok(Frequency::Monthly),
            _ => {}
        }

        let rest = text.strip_prefix("Every ").ok_or_else(invalid)?;
        let tokens: Vec<&str> = rest.split(' ').collect();
        match tokens.as_slice() {
            [count, "Days"] => {
                // Plain decimal, no sign and no leading zero (which also rules out 0).
                if !count.bytes().all(|b| b.is_ascii_digit()) || count.starts_with('0') {
                    return Err(invalid());
                }
                let days: u32 = count.parse().map_err(|_| invalid())?;
                Ok(Frequency::EveryNDays(days))
            }
            [day] => parse_weekday(day).map(Frequency::EveryWeekday).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => f.write_str("Daily"),
            Frequency::Weekly => f.write_str("Weekly"),
            Frequency::Monthly => f.write_str("Monthly"),
            Frequency::EveryNDays(days) => write!(f, "Every {days} Days"),
            Frequency::EveryWeekday(day) => write!(f, "Every {}", weekday_name(*day)),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = HabitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.to_string()
    }
}

const WEEKDAYS: [(Weekday, &str); 7] = [
    (Weekday::Mon, "Monday"),
    (Weekday::Tue, "Tuesday"),
    (Weekday::Wed, "Wednesday"),
    (Weekday::Thu, "Thursday"),
    (Weekday::Fri, "Friday"),
    (Weekday::Sat, "Saturday"),
    (Weekday::Sun, "Sunday"),
];

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize].1
}

/// Capitalised full English weekday names only.
fn parse_weekday(token: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(_, name)| *name == token)
        .map(|(day, _)| *day)
}
