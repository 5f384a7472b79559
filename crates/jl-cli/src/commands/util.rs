//! Shared utilities for CLI commands.

use anyhow::{Context, Result, bail};
use jl_core::{Journal, JournalError, ParsedJournal};

use crate::config::Settings;

/// Parse `journal`, turning a missing file into a user-facing error.
pub fn parse_journal<'a>(journal: &'a mut Journal, settings: &Settings) -> Result<&'a ParsedJournal> {
    let date = journal.date();
    match journal.parse(&settings.switching_cost) {
        Ok(parsed) => Ok(parsed),
        Err(JournalError::NotFound { path }) => {
            bail!("No journal found for {date} (expected {})", path.display())
        }
        Err(err) => Err(err).with_context(|| format!("Error parsing journal for {date}")),
    }
}
