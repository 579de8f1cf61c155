use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::{format_date, parse_date};
use crate::due::next_due;
use crate::error::Result;
use crate::frequency::Frequency;
use crate::stats::days_until;
use crate::streak::current_streak;

/// A tracked habit together with its performance log.
///
/// `logs` is ascending, free of duplicates and never empty. `streak` and
/// `next_due_date` are caches derived from the log; every log mutation
/// refreshes both before returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitRecord {
    name: String,
    goal: String,
    frequency: Frequency,
    strict: bool,
    start_date: NaiveDate,
    logs: Vec<NaiveDate>,
    streak: u32,
    next_due_date: NaiveDate,
}

/// Shape of a habit inside the save file. Dates and the frequency stay
/// strings here so malformed input surfaces as a typed error on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitSnapshot {
    pub name: String,
    pub goal: String,
    pub frequency: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// Why a perform request left the log untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AlreadyLogged { date: NaiveDate },
    StrictViolation { date: NaiveDate, due: NaiveDate },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::AlreadyLogged { date } => {
                write!(f, "this activity was already logged on {date}")
            }
            Rejection::StrictViolation { date, due } => write!(
                f,
                "strict mode is set: this activity is due on {due}, not {date}"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformOutcome {
    Logged,
    Rejected(Rejection),
}

impl PerformOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, PerformOutcome::Logged)
    }

    /// Human-readable reason for a rejection; empty when the date was logged.
    pub fn reason(&self) -> String {
        match self {
            PerformOutcome::Logged => String::new(),
            PerformOutcome::Rejected(rejection) => rejection.to_string(),
        }
    }
}

/// Partial update for [`HabitRecord::edit`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitEdit {
    pub name: Option<String>,
    pub goal: Option<String>,
    pub frequency: Option<Frequency>,
}

pub struct HabitBuilder {
    name: String,
    goal: String,
    frequency: Frequency,
    start_date: Option<NaiveDate>,
    strict: bool,
    logs: Vec<NaiveDate>,
}

impl HabitBuilder {
    pub fn new(name: impl Into<String>, goal: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            frequency,
            start_date: None,
            strict: false,
            logs: Vec::new(),
        }
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn logs(mut self, logs: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.logs.extend(logs);
        self
    }

    /// Build the record, defaulting the start date to `as_of` and seeding an
    /// empty log with the start date.
    pub fn build(self, as_of: NaiveDate) -> Result<HabitRecord> {
        let start_date = self.start_date.unwrap_or(as_of);
        let mut logs = self.logs;
        logs.sort_unstable();
        logs.dedup();
        if logs.is_empty() {
            logs.push(start_date);
        }

        let mut habit = HabitRecord {
            name: self.name,
            goal: self.goal,
            frequency: self.frequency,
            strict: self.strict,
            start_date,
            next_due_date: start_date,
            logs,
            streak: 1,
        };
        habit.next_due_date = next_due(habit.last_performed(), &habit.frequency)?;
        habit.streak = current_streak(&habit.logs, &habit.frequency, as_of)?;
        debug!(
            name = %habit.name,
            frequency = %habit.frequency,
            logs = habit.logs.len(),
            streak = habit.streak,
            "built habit"
        );
        Ok(habit)
    }
}

impl HabitRecord {
    pub fn builder(
        name: impl Into<String>,
        goal: impl Into<String>,
        frequency: Frequency,
    ) -> HabitBuilder {
        HabitBuilder::new(name, goal, frequency)
    }

    /// Rebuild a record from its persisted form. The stored streak is
    /// ignored; both caches are recomputed.
    pub fn from_snapshot(snapshot: HabitSnapshot, as_of: NaiveDate) -> Result<Self> {
        let frequency = Frequency::parse(&snapshot.frequency)?;
        let logs = snapshot
            .logs
            .iter()
            .map(|raw| parse_date(raw))
            .collect::<Result<Vec<_>>>()?;
        let mut builder = HabitBuilder::new(snapshot.name, snapshot.goal, frequency)
            .strict(snapshot.strict)
            .logs(logs);
        if let Some(raw) = snapshot.start_date.as_deref() {
            builder = builder.start_date(parse_date(raw)?);
        }
        builder.build(as_of)
    }

    pub fn to_snapshot(&self) -> HabitSnapshot {
        HabitSnapshot {
            name: self.name.clone(),
            goal: self.goal.clone(),
            frequency: self.frequency.to_string(),
            start_date: Some(format_date(self.start_date)),
            strict: self.strict,
            streak: self.streak,
            logs: self.logs.iter().map(|date| format_date(*date)).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn frequency(&self) -> &Frequency {
        &self.frequency
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn logs(&self) -> &[NaiveDate] {
        &self.logs
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn next_due_date(&self) -> NaiveDate {
        self.next_due_date
    }

    pub fn last_performed(&self) -> NaiveDate {
        self.logs.last().copied().unwrap_or(self.start_date)
    }

    pub fn days_until_due(&self, as_of: NaiveDate) -> i64 {
        days_until(self.next_due_date, as_of)
    }

    /// Streak as shown in habit lists: an overdue habit shows 0. The cached
    /// streak itself is left alone.
    pub fn displayed_streak(&self, as_of: NaiveDate) -> u32 {
        if self.days_until_due(as_of) < 0 {
            0
        } else {
            self.streak
        }
    }

    pub fn perform_today(&mut self, today: NaiveDate) -> Result<PerformOutcome> {
        self.perform_on(today, today)
    }

    /// Log the habit as performed on `date`. Duplicates and, for strict
    /// habits, dates other than the due date are rejected without touching
    /// the record.
    pub fn perform_on(&mut self, date: NaiveDate, as_of: NaiveDate) -> Result<PerformOutcome> {
        let Err(position) = self.logs.binary_search(&date) else {
            debug!(name = %self.name, %date, "date already logged, skipping");
            return Ok(PerformOutcome::Rejected(Rejection::AlreadyLogged { date }));
        };
        if self.strict && date != self.next_due_date {
            debug!(name = %self.name, %date, due = %self.next_due_date, "strict habit not due");
            return Ok(PerformOutcome::Rejected(Rejection::StrictViolation {
                date,
                due: self.next_due_date,
            }));
        }

        let mut logs = self.logs.clone();
        logs.insert(position, date);
        let last = logs.last().copied().unwrap_or(date);
        let streak = current_streak(&logs, &self.frequency, as_of)?;
        let next_due_date = next_due(last, &self.frequency)?;

        self.logs = logs;
        self.streak = streak;
        self.next_due_date = next_due_date;
        debug!(name = %self.name, %date, streak, due = %next_due_date, "habit performed");
        Ok(PerformOutcome::Logged)
    }

    /// Apply a partial update. A new frequency refreshes `next_due_date`
    /// only; the streak stays as it was until [`Self::recompute_streak`].
    pub fn edit(&mut self, edit: HabitEdit) -> Result<()> {
        if let Some(frequency) = edit.frequency {
            self.next_due_date = next_due(self.last_performed(), &frequency)?;
            self.frequency = frequency;
        }
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(goal) = edit.goal {
            self.goal = goal;
        }
        Ok(())
    }

    pub fn recompute_streak(&mut self, as_of: NaiveDate) -> Result<u32> {
        self.streak = current_streak(&self.logs, &self.frequency, as_of)?;
        Ok(self.streak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HabitError;

    fn date(raw: &str) -> NaiveDate {
        parse_date(raw).unwrap()
    }

    fn daily(logs: &[&str]) -> HabitRecord {
        HabitRecord::builder("Meditate", "Calm mind", Frequency::Daily)
            .start_date(date("2024-01-01"))
            .logs(logs.iter().map(|raw| date(raw)))
            .build(date("2024-01-10"))
            .unwrap()
    }

    #[test]
    fn empty_log_is_seeded_with_start_date() {
        let habit = daily(&[]);
        assert_eq!(habit.logs(), &[date("2024-01-01")]);
        assert_eq!(habit.streak(), 1);
        assert_eq!(habit.next_due_date(), date("2024-01-02"));
    }

    #[test]
    fn start_date_defaults_to_as_of() {
        let habit = HabitRecord::builder("Read", "", Frequency::Weekly)
            .build(date("2024-01-01"))
            .unwrap();
        assert_eq!(habit.start_date(), date("2024-01-01"));
        assert_eq!(habit.next_due_date(), date("2024-01-14"));
    }

    #[test]
    fn supplied_logs_are_sorted_and_deduplicated() {
        let habit = daily(&["2024-01-03", "2024-01-02", "2024-01-03"]);
        assert_eq!(habit.logs(), &[date("2024-01-02"), date("2024-01-03")]);
        assert_eq!(habit.streak(), 2);
        assert_eq!(habit.next_due_date(), date("2024-01-04"));
    }

    #[test]
    fn perform_extends_streak_and_moves_due_date() {
        let mut habit = daily(&["2024-01-01", "2024-01-02"]);
        let outcome = habit.perform_today(date("2024-01-03")).unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(outcome.reason(), "");
        assert_eq!(habit.streak(), 3);
        assert_eq!(habit.next_due_date(), date("2024-01-04"));
    }

    #[test]
    fn perform_on_past_date_keeps_logs_sorted() {
        let mut habit = daily(&["2024-01-01", "2024-01-03"]);
        assert_eq!(habit.streak(), 1);
        let outcome = habit.perform_on(date("2024-01-02"), date("2024-01-03")).unwrap();
        assert_eq!(outcome, PerformOutcome::Logged);
        assert_eq!(
            habit.logs(),
            &[date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]
        );
        assert_eq!(habit.streak(), 3);
        assert_eq!(habit.next_due_date(), date("2024-01-04"));
    }

    #[test]
    fn duplicate_perform_is_a_noop() {
        let mut habit = daily(&["2024-01-01", "2024-01-02"]);
        let before = habit.clone();
        let outcome = habit.perform_today(date("2024-01-02")).unwrap();
        assert_eq!(
            outcome,
            PerformOutcome::Rejected(Rejection::AlreadyLogged {
                date: date("2024-01-02")
            })
        );
        assert!(!outcome.reason().is_empty());
        assert_eq!(habit, before);
    }

    #[test]
    fn strict_habit_only_accepts_due_date() {
        let mut habit = HabitRecord::builder("Run", "5k", Frequency::EveryNDays(3))
            .start_date(date("2024-01-01"))
            .strict(true)
            .build(date("2024-01-01"))
            .unwrap();
        assert_eq!(habit.next_due_date(), date("2024-01-04"));

        let before = habit.clone();
        let outcome = habit.perform_today(date("2024-01-03")).unwrap();
        assert_eq!(
            outcome,
            PerformOutcome::Rejected(Rejection::StrictViolation {
                date: date("2024-01-03"),
                due: date("2024-01-04"),
            })
        );
        assert_eq!(habit, before);

        assert!(habit.perform_today(date("2024-01-04")).unwrap().is_accepted());
        assert_eq!(habit.streak(), 2);
        assert_eq!(habit.next_due_date(), date("2024-01-07"));
    }

    #[test]
    fn frequency_edit_refreshes_due_date_but_not_streak() {
        let mut habit = daily(&["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(habit.streak(), 3);

        habit
            .edit(HabitEdit {
                frequency: Some(Frequency::EveryNDays(7)),
                ..HabitEdit::default()
            })
            .unwrap();
        assert_eq!(habit.frequency(), &Frequency::EveryNDays(7));
        assert_eq!(habit.next_due_date(), date("2024-01-10"));
        assert_eq!(habit.streak(), 3);

        habit
            .edit(HabitEdit {
                frequency: Some(Frequency::Monthly),
                ..HabitEdit::default()
            })
            .unwrap();
        assert_eq!(habit.recompute_streak(date("2024-01-03")).unwrap(), 3);
    }

    #[test]
    fn unreachable_due_date_fails_to_build() {
        let huge = Frequency::parse("Every 4000000000 Days").unwrap();
        let result = HabitRecord::builder("Someday", "", huge)
            .start_date(date("2024-01-01"))
            .build(date("2024-01-01"));
        assert!(matches!(result, Err(HabitError::DateOutOfRange(_))));

        let mut habit = daily(&["2024-01-01"]);
        let before = habit.clone();
        let err = habit
            .edit(HabitEdit {
                frequency: Some(huge),
                ..HabitEdit::default()
            })
            .unwrap_err();
        assert!(matches!(err, HabitError::DateOutOfRange(_)));
        assert_eq!(habit, before);
    }

    #[test]
    fn name_and_goal_edits_are_partial() {
        let mut habit = daily(&[]);
        habit
            .edit(HabitEdit {
                name: Some("Breathe".into()),
                ..HabitEdit::default()
            })
            .unwrap();
        assert_eq!(habit.name(), "Breathe");
        assert_eq!(habit.goal(), "Calm mind");
        assert_eq!(habit.frequency(), &Frequency::Daily);
    }

    #[test]
    fn overdue_habit_displays_zero_streak() {
        let habit = daily(&["2024-01-01", "2024-01-02"]);
        assert_eq!(habit.displayed_streak(date("2024-01-03")), 2);
        assert_eq!(habit.displayed_streak(date("2024-01-04")), 0);
        assert_eq!(habit.streak(), 2);
    }

    #[test]
    fn snapshot_round_trip_recomputes_caches() {
        let mut habit = HabitRecord::builder("Gym", "Strength", Frequency::Weekly)
            .start_date(date("2024-01-01"))
            .strict(true)
            .build(date("2024-01-01"))
            .unwrap();
        habit.perform_today(date("2024-01-14")).unwrap();

        let snapshot = habit.to_snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: HabitSnapshot = serde_json::from_str(&json).unwrap();
        let restored = HabitRecord::from_snapshot(restored, date("2024-01-14")).unwrap();
        assert_eq!(restored, habit);
    }

    #[test]
    fn snapshot_with_bad_data_is_rejected() {
        let mut snapshot = daily(&[]).to_snapshot();
        snapshot.logs.push("2024/01/05".into());
        assert_eq!(
            HabitRecord::from_snapshot(snapshot, date("2024-01-10")),
            Err(HabitError::InvalidDateFormat("2024/01/05".into()))
        );

        let mut snapshot = daily(&[]).to_snapshot();
        snapshot.frequency = "Annually".into();
        assert_eq!(
            HabitRecord::from_snapshot(snapshot, date("2024-01-10")),
            Err(HabitError::InvalidFrequency("Annually".into()))
        );
    }
}
