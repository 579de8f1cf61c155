use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Duration, Local, NaiveDate};
use habit_core::dates::parse_date;
use habit_core::stats::HabitSummary;
use habit_core::store::DEFAULT_SAVEFILE;
use habit_core::{HabitEdit, HabitRecord, HabitStore};
use tracing::{debug, info, warn};

use crate::cli::{AddArgs, Cli, Commands, EditArgs, PerformArgs};

const DEFAULT_PROFILE: &str = "default";
const HISTORY_DAYS: i64 = 21;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub(crate) savefile: PathBuf,
    pub(crate) profile: String,
    pub(crate) today: Option<NaiveDate>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("HABIT_SAVEFILE") {
            if !path.trim().is_empty() {
                config.savefile = PathBuf::from(path);
            }
        }
        if let Ok(profile) = std::env::var("HABIT_PROFILE") {
            if !profile.trim().is_empty() {
                config.profile = profile.trim().to_string();
            }
        }
        if let Ok(today) = std::env::var("HABIT_TODAY") {
            match parse_date(&today) {
                Ok(date) => config.today = Some(date),
                Err(err) => warn!(%err, "ignoring HABIT_TODAY"),
            }
        }
        Ok(config)
    }

    /// Command-line flags win over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.savefile {
            self.savefile = path.clone();
        }
        if let Some(profile) = &cli.profile {
            self.profile = profile.clone();
        }
        if let Some(today) = cli.today {
            self.today = Some(today);
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            savefile: PathBuf::from(DEFAULT_SAVEFILE),
            profile: DEFAULT_PROFILE.to_string(),
            today: None,
        }
    }
}

pub fn run(config: AppConfig, command: Commands) -> Result<()> {
    let today = config.today();
    info!(savefile = %config.savefile.display(), profile = %config.profile, %today, "opening save file");
    let store = HabitStore::open(&config.savefile)?;
    let output = execute(&store, &config.profile, today, command)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Run one command against `store` and return what should be printed.
pub fn execute(store: &HabitStore, profile: &str, today: NaiveDate, command: Commands) -> Result<String> {
    match command {
        Commands::List => {
            let habits = store.load(profile, today)?;
            Ok(render_list(&habits, today))
        }
        Commands::Add(args) => add_habit(store, profile, today, args),
        Commands::Perform(args) => perform_habit(store, profile, today, args),
        Commands::Edit(args) => edit_habit(store, profile, today, args),
        Commands::Remove(arg) => {
            let removed = store.remove_habit(profile, to_position(arg.index)?, today)?;
            Ok(format!("Removed \"{}\"", removed.name()))
        }
        Commands::Stats(arg) => {
            let habits = store.load(profile, today)?;
            let habit = habits
                .get(to_position(arg.index)?)
                .ok_or_else(|| anyhow!("no habit #{} in profile `{profile}`", arg.index))?;
            let summary = HabitSummary::for_habit(habit, today)?;
            Ok(render_summary(habit, &summary, today))
        }
        Commands::Profiles => Ok(store.profiles().join("\n")),
    }
}

fn add_habit(store: &HabitStore, profile: &str, today: NaiveDate, args: AddArgs) -> Result<String> {
    let mut builder = HabitRecord::builder(args.name, args.goal, args.frequency).strict(args.strict);
    if let Some(start) = args.start_date {
        builder = builder.start_date(start);
    }
    let habit = builder.build(today)?;
    let message = format!(
        "Added \"{}\" ({}), next due {}",
        habit.name(),
        habit.frequency(),
        habit.next_due_date()
    );
    store.add_habit(profile, habit, today)?;
    Ok(message)
}

fn perform_habit(store: &HabitStore, profile: &str, today: NaiveDate, args: PerformArgs) -> Result<String> {
    let date = args.date.unwrap_or(today);
    let (outcome, streak, due) = store.update_habit(profile, to_position(args.index)?, today, |habit| {
        let outcome = habit.perform_on(date, today)?;
        Ok((outcome, habit.streak(), habit.next_due_date()))
    })?;
    if outcome.is_accepted() {
        Ok(format!("Logged {date}. Streak {streak}, next due {due}"))
    } else {
        debug!(reason = %outcome.reason(), "perform rejected");
        Ok(format!("Not logged: {}", outcome.reason()))
    }
}

fn edit_habit(store: &HabitStore, profile: &str, today: NaiveDate, args: EditArgs) -> Result<String> {
    let frequency_changed = args.frequency.is_some();
    let edit = HabitEdit {
        name: args.name,
        goal: args.goal,
        frequency: args.frequency,
    };
    store.update_habit(profile, to_position(args.index)?, today, |habit| {
        habit.edit(edit)?;
        // Editing only refreshes the due date; the streak is ours to redo.
        if frequency_changed {
            habit.recompute_streak(today)?;
        }
        Ok(format!(
            "Updated \"{}\" ({}). Streak {}, next due {}",
            habit.name(),
            habit.frequency(),
            habit.streak(),
            habit.next_due_date()
        ))
    })
}

/// Habits are numbered from 1 on the command line.
fn to_position(index: usize) -> Result<usize> {
    index
        .checked_sub(1)
        .ok_or_else(|| anyhow!("habit numbers start at 1"))
}

fn render_list(habits: &[HabitRecord], today: NaiveDate) -> String {
    if habits.is_empty() {
        return "No habits yet".to_string();
    }
    habits
        .iter()
        .enumerate()
        .map(|(idx, habit)| {
            format!(
                "#{} {} [{}]{} · last {} · due {} ({}) · streak {} · {}",
                idx + 1,
                habit.name(),
                habit.frequency(),
                if habit.is_strict() { " strict" } else { "" },
                habit.last_performed(),
                habit.next_due_date(),
                format_relative_label(habit.next_due_date(), today),
                habit.displayed_streak(today),
                history_graph(habit, today),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_summary(habit: &HabitRecord, summary: &HabitSummary, today: NaiveDate) -> String {
    let mut lines = vec![
        format!("{} [{}]", habit.name(), habit.frequency()),
    ];
    if !habit.goal().trim().is_empty() {
        lines.push(format!("Goal: {}", habit.goal()));
    }
    lines.push(format!("Started: {}", habit.start_date()));
    lines.push(format!("Current streak: {}", summary.current_streak));
    lines.push(format!("Longest streak: {}", summary.longest_streak));
    lines.push(format!("Streak broken: {} times", summary.streak_breaks));
    lines.push(format!("Consistency: {:.2}%", summary.consistency_rate));
    lines.push(format!("Average interval: {} days", summary.average_interval_days));
    lines.push(format!("Longest break: {} days", summary.longest_gap_days));
    lines.push(format!("Performed this month: {}", summary.performed_this_month));
    lines.push(format!(
        "Next due: {} ({})",
        summary.next_due_date,
        format_relative_label(summary.next_due_date, today)
    ));
    lines.join("\n")
}

/// One cell per day of the last three weeks, oldest first: `X` logged,
/// `_` not logged.
fn history_graph(habit: &HabitRecord, today: NaiveDate) -> String {
    (0..HISTORY_DAYS)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            if habit.logs().binary_search(&day).is_ok() {
                'X'
            } else {
                '_'
            }
        })
        .collect()
}

fn format_relative_label(date: NaiveDate, today: NaiveDate) -> String {
    let diff = date.signed_duration_since(today).num_days();
    match diff {
        -1 => "yesterday".to_string(),
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        d => format!("in {} days", d),
    }
}
