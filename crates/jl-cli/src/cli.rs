//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::{Args, Parser, Subcommand};

/// Daily journal worklog summaries.
///
/// Reads a day's outline journal, totals the time logged against each task
/// and estimates context-switching overhead.
#[derive(Debug, Parser)]
#[command(name = "jl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the duration summary and problems for a day.
    Summary {
        #[command(flatten)]
        day: DayArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the time logged against each task for a day.
    Worklog {
        #[command(flatten)]
        day: DayArgs,
    },
}

/// Selects which day's journal to read.
#[derive(Debug, Clone, Args)]
pub struct DayArgs {
    /// Journal date (YYYY-MM-DD).
    #[arg(long, conflicts_with = "offset")]
    pub date: Option<NaiveDate>,

    /// Days before today (0 = today, 1 = yesterday, ...).
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

impl DayArgs {
    /// Resolve the selected date relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        self.date.unwrap_or_else(|| {
            today
                .checked_sub_days(Days::new(u64::from(self.offset)))
                .unwrap_or(NaiveDate::MIN)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn offset_counts_back_from_today() {
        let cli = Cli::parse_from(["jl", "summary", "--offset", "1"]);
        let Some(Commands::Summary { day, json }) = cli.command else {
            panic!("expected summary command");
        };
        assert!(!json);
        assert_eq!(day.resolve(today()), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn defaults_to_today() {
        let cli = Cli::parse_from(["jl", "worklog"]);
        let Some(Commands::Worklog { day }) = cli.command else {
            panic!("expected worklog command");
        };
        assert_eq!(day.resolve(today()), today());
    }

    #[test]
    fn explicit_date_wins() {
        let cli = Cli::parse_from(["jl", "summary", "--date", "2024-01-15", "--json"]);
        let Some(Commands::Summary { day, json }) = cli.command else {
            panic!("expected summary command");
        };
        assert!(json);
        assert_eq!(day.resolve(today()), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn date_and_offset_conflict() {
        let result = Cli::try_parse_from(["jl", "summary", "--date", "2024-01-15", "--offset", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn negative_offset_is_rejected() {
        let result = Cli::try_parse_from(["jl", "summary", "--offset", "-1"]);
        assert!(result.is_err());
    }
}
