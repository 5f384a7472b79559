//! Worklog command: one line per task, ready to copy into a time sheet.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use jl_core::{ParsedJournal, format_duration};

const MISSING_TASK_ID: &str = "(no id)";

/// One task's entry in the worklog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogRow {
    pub task_id: Option<String>,
    pub description: String,
    /// Rounded duration in seconds.
    pub duration: u64,
    /// Whether the task failed validation.
    pub invalid: bool,
}

/// Build worklog rows for every task in document order.
pub fn worklog_rows(parsed: &ParsedJournal) -> Vec<WorklogRow> {
    parsed
        .task_ids()
        .iter()
        .filter_map(|&id| {
            let task = parsed.tree().get(id).task()?;
            Some(WorklogRow {
                task_id: task.task_id().map(str::to_string),
                description: task.description().to_string(),
                duration: task.total_duration(),
                invalid: parsed.task_errors(id).is_some_and(|errors| !errors.is_empty()),
            })
        })
        .collect()
}

/// Formats the worklog. Invalid tasks are marked with `!`.
pub fn format_worklog(date: NaiveDate, rows: &[WorklogRow]) -> String {
    let mut output = String::new();

    writeln!(output, "WORKLOG: {}", date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();

    if rows.is_empty() {
        writeln!(output, "No tasks found.").unwrap();
        return output;
    }

    for row in rows {
        let marker = if row.invalid { '!' } else { ' ' };
        let task_id = row.task_id.as_deref().unwrap_or(MISSING_TASK_ID);
        writeln!(
            output,
            "{marker} {task_id:<10} {:>7}  {}",
            format_duration(row.duration),
            row.description
        )
        .unwrap();
    }

    let invalid = rows.iter().filter(|row| row.invalid).count();
    if invalid > 0 {
        writeln!(output).unwrap();
        writeln!(
            output,
            "{invalid} of {} tasks have problems; run `jl summary` for details.",
            rows.len()
        )
        .unwrap();
    }

    output
}

/// Writes the worklog for `parsed` to `writer`.
pub fn run<W: Write>(writer: &mut W, parsed: &ParsedJournal) -> Result<()> {
    let rows = worklog_rows(parsed);
    tracing::debug!(rows = rows.len(), "generated worklog");
    write!(writer, "{}", format_worklog(parsed.date(), &rows))?;
    Ok(())
}
