//! Logbook timer entries.
//!
//! A task's logbook holds completed timer intervals in the form written by
//! the outliner:
//!
//! ```text
//! :LOGBOOK:
//! CLOCK: [2024-01-15 Mon 09:00:00]--[2024-01-15 Mon 09:10:00] =>  00:10:00
//! :END:
//! ```

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use nom::{
    IResult,
    bytes::complete::{is_not, tag},
    character::complete::{char, space0, space1},
    combinator::rest,
    sequence::delimited,
};
use serde::Serialize;
use thiserror::Error;

use crate::duration::{DurationError, parse_clock_duration};

/// Prefix identifying a timer line.
pub const CLOCK_MARKER: &str = "CLOCK:";

/// Separator between a timer's interval and its recorded duration.
pub const DURATION_SEPARATOR: &str = "=>";

/// Opening sentinel of a logbook section.
pub const LOGBOOK_START: &str = ":LOGBOOK:";

/// Closing sentinel of a logbook section.
pub const LOGBOOK_END: &str = ":END:";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %a %H:%M:%S";

/// Errors raised for timer lines that cannot be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogEntryError {
    /// The line is not shaped like `CLOCK: [start]--[end] => H:M:S`.
    #[error("malformed timer line: {0:?}")]
    Malformed(String),

    /// The recorded duration could not be decoded.
    #[error("invalid timer duration in {line:?}")]
    Duration {
        line: String,
        #[source]
        source: DurationError,
    },
}

/// One completed timed interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    start: String,
    end: String,
    duration: u64,
}

type PResult<'a, T> = IResult<&'a str, T>;

fn bracketed(i: &str) -> PResult<'_, &str> {
    delimited(char('['), is_not("]"), char(']'))(i)
}

/// `CLOCK: [start]--[end] => H:M:S`, yielding the raw parts.
fn timer_line(i: &str) -> PResult<'_, (&str, &str, &str)> {
    let (i, _) = tag(CLOCK_MARKER)(i)?;
    let (i, _) = space1(i)?;
    let (i, start) = bracketed(i)?;
    let (i, _) = tag("--")(i)?;
    let (i, end) = bracketed(i)?;
    let (i, _) = space0(i)?;
    let (i, _) = tag(DURATION_SEPARATOR)(i)?;
    let (i, _) = space0(i)?;
    let (i, duration) = rest(i)?;
    Ok((i, (start, end, duration.trim())))
}

impl LogEntry {
    /// Decode a timer line that carries a recorded duration.
    pub fn parse(line: &str) -> Result<Self, LogEntryError> {
        let line = line.trim();
        let (_, (start, end, duration)) =
            timer_line(line).map_err(|_| LogEntryError::Malformed(line.to_string()))?;

        let duration = parse_clock_duration(duration).map_err(|source| LogEntryError::Duration {
            line: line.to_string(),
            source,
        })?;

        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
            duration,
        })
    }

    /// Build an entry encoding `duration` seconds, anchored at midnight on
    /// `date`.
    ///
    /// The clock values are fabricated; only the duration carries meaning.
    pub fn from_duration(date: NaiveDate, duration: u64) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        let end = i64::try_from(duration)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| start.checked_add_signed(delta))
            .unwrap_or(NaiveDateTime::MAX);

        Self {
            start: start.format(TIMESTAMP_FORMAT).to_string(),
            end: end.format(TIMESTAMP_FORMAT).to_string(),
            duration,
        }
    }

    /// Recorded duration in seconds.
    pub const fn duration(&self) -> u64 {
        self.duration
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Render the entry back into timer-line form.
    pub fn line(&self) -> String {
        let hours = self.duration / 3600;
        let minutes = (self.duration % 3600) / 60;
        let seconds = self.duration % 60;
        format!(
            "{CLOCK_MARKER} [{}]--[{}] {DURATION_SEPARATOR} {hours:02}:{minutes:02}:{seconds:02}",
            self.start, self.end
        )
    }
}
