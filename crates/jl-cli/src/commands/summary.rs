//! Summary command for a day's journal.
//!
//! Shows the number of tasks found, the estimated switching cost, the
//! rounded total duration and the slack left against the daily target,
//! followed by any problems found while parsing.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use jl_core::{ParsedJournal, Problem, format_duration};
use serde::Serialize;

/// Computed summary data.
#[derive(Debug)]
pub struct SummaryData {
    pub date: NaiveDate,
    pub task_count: usize,
    pub switching_cost: u64,
    pub includes_switching_cost: bool,
    pub total_duration: u64,
    pub target_duration: u64,
    pub slack_time: u64,
    pub problems: Vec<Problem>,
}

/// Collect summary data from a parsed journal. Durations are in seconds.
pub fn summarize(parsed: &ParsedJournal, target_duration: u64) -> SummaryData {
    let total_duration = parsed.total_duration();
    SummaryData {
        date: parsed.date(),
        task_count: parsed.task_ids().len(),
        switching_cost: parsed.total_switching_cost(),
        includes_switching_cost: parsed.includes_switching_cost(),
        total_duration,
        target_duration,
        slack_time: target_duration.saturating_sub(total_duration),
        problems: parsed.problems().to_vec(),
    }
}

/// Formats the human-readable summary.
pub fn format_summary(data: &SummaryData) -> String {
    let mut output = String::new();

    writeln!(output, "JOURNAL: {}", data.date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Tasks found:      {}", data.task_count).unwrap();
    writeln!(
        output,
        "Switching cost:   {}",
        format_duration(data.switching_cost)
    )
    .unwrap();

    let inclusion = if data.includes_switching_cost {
        "(including switching cost)"
    } else {
        "(not including switching cost)"
    };
    writeln!(
        output,
        "Total duration:   {} {inclusion}",
        format_duration(data.total_duration)
    )
    .unwrap();
    writeln!(
        output,
        "Target duration:  {}",
        format_duration(data.target_duration)
    )
    .unwrap();
    writeln!(output, "Slack time:       {}", format_duration(data.slack_time)).unwrap();

    if !data.problems.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "PROBLEMS").unwrap();
        writeln!(output, "────────").unwrap();
        for problem in &data.problems {
            writeln!(output, "{problem}").unwrap();
        }
    }

    output
}

// ========== JSON Output ==========

/// JSON summary structure. Durations are in seconds.
#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    pub date: String,
    pub task_count: usize,
    pub switching_cost: u64,
    pub includes_switching_cost: bool,
    pub total_duration: u64,
    pub target_duration: u64,
    pub slack_time: u64,
    pub problems: &'a [Problem],
}

/// Formats summary data as JSON.
pub fn format_summary_json(data: &SummaryData) -> Result<String> {
    let summary = JsonSummary {
        date: data.date.format("%Y-%m-%d").to_string(),
        task_count: data.task_count,
        switching_cost: data.switching_cost,
        includes_switching_cost: data.includes_switching_cost,
        total_duration: data.total_duration,
        target_duration: data.target_duration,
        slack_time: data.slack_time,
        problems: &data.problems,
    };

    Ok(serde_json::to_string_pretty(&summary)?)
}

// ========== Public Interface ==========

/// Writes the summary for `parsed` to `writer`.
pub fn run<W: Write>(
    writer: &mut W,
    parsed: &ParsedJournal,
    target_duration: u64,
    json: bool,
) -> Result<()> {
    let data = summarize(parsed, target_duration);
    tracing::debug!(
        tasks = data.task_count,
        problems = data.problems.len(),
        "generated summary"
    );

    if json {
        writeln!(writer, "{}", format_summary_json(&data)?)?;
    } else {
        write!(writer, "{}", format_summary(&data))?;
    }
    Ok(())
}
