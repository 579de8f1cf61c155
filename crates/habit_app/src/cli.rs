use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use habit_core::Frequency;

#[derive(Parser)]
#[command(name = "habithero", about = "Track habits, streaks and due dates", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Save file to read and write
    #[arg(long, global = true)]
    pub savefile: Option<PathBuf>,

    /// Profile whose habits are used
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Evaluate as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List habits with their streaks and due dates
    List,
    /// Create a new habit
    Add(AddArgs),
    /// Log a habit as performed
    Perform(PerformArgs),
    /// Change a habit's name, goal or frequency
    Edit(EditArgs),
    /// Delete a habit
    Remove(IndexArg),
    /// Show streak and consistency statistics for a habit
    Stats(IndexArg),
    /// List profiles in the save file
    Profiles,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value = "")]
    pub goal: String,
    /// Daily, Weekly, Monthly, "Every <N> Days" or "Every <Weekday>"
    #[arg(long, value_parser = parse_frequency_arg)]
    pub frequency: Frequency,
    #[arg(long, value_parser = parse_date_arg)]
    pub start_date: Option<NaiveDate>,
    /// Only accept performances on the due date
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct PerformArgs {
    /// Habit number as shown by `list`
    pub index: usize,
    /// Date to log instead of today
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Habit number as shown by `list`
    pub index: usize,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub goal: Option<String>,
    #[arg(long, value_parser = parse_frequency_arg)]
    pub frequency: Option<Frequency>,
}

#[derive(Args)]
pub struct IndexArg {
    /// Habit number as shown by `list`
    pub index: usize,
}

fn parse_frequency_arg(raw: &str) -> Result<Frequency, String> {
    Frequency::parse(raw).map_err(|err| err.to_string())
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    habit_core::dates::parse_date(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_frequency_grammar() {
        let cli = Cli::try_parse_from([
            "habithero",
            "--profile",
            "alice",
            "add",
            "--name",
            "Run",
            "--frequency",
            "Every 3 Days",
            "--strict",
        ])
        .unwrap();
        assert_eq!(cli.profile.as_deref(), Some("alice"));
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.frequency, Frequency::EveryNDays(3));
                assert!(args.strict);
                assert_eq!(args.goal, "");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn rejects_unknown_frequency_and_bad_dates() {
        assert!(Cli::try_parse_from([
            "habithero", "add", "--name", "x", "--frequency", "Annually"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["habithero", "--today", "03/01/2024", "list"]).is_err());
    }
}
