use anyhow::{Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use jl_cli::commands::{summary, util, worklog};
use jl_cli::{Cli, Commands, Config, DayArgs, Settings};
use jl_core::Journal;

/// Load config and validate it into settings.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config.settings()?)
}

/// Build the journal for the selected day.
fn journal_for(day: &DayArgs, settings: &Settings) -> Journal {
    let date = day.resolve(Local::now().date_naive());
    Journal::new(&settings.graph_path, date)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Some(Commands::Summary { day, json }) => {
            let settings = load_settings(&cli)?;
            let mut journal = journal_for(day, &settings);
            let parsed = util::parse_journal(&mut journal, &settings)?;
            summary::run(&mut stdout, parsed, settings.target_duration, *json)?;
        }
        Some(Commands::Worklog { day }) => {
            let settings = load_settings(&cli)?;
            let mut journal = journal_for(day, &settings);
            let parsed = util::parse_journal(&mut journal, &settings)?;
            worklog::run(&mut stdout, parsed)?;
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
