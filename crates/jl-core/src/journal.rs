//! Daily journal aggregation.
//!
//! A [`Journal`] is bound to one calendar date. Parsing reads
//! `<graph>/journals/YYYY_MM_DD.md`, builds the block tree, converts manual
//! `time::` properties into logbook entries, totals each task, estimates
//! switching cost and allocates it to the catch-all task. Problems found on
//! the way are collected rather than raised.
//!
//! # State
//!
//! A journal starts out unparsed; [`Journal::parsed`] returns `None` until a
//! [`Journal::parse`] call succeeds. Every parse rebuilds the result from
//! scratch.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::block::{Block, BlockId, BlockTree, Outline, OutlineBuilder, build_outline};
use crate::duration::{format_duration, parse_free_duration, round_duration};
use crate::logbook::LogEntry;
use crate::switching::SwitchingCost;
use crate::task::{TaskData, ValidationErrors, find_tasks, validate};

/// Directory under the graph root holding daily journals.
pub const JOURNALS_DIR: &str = "journals";

/// Task property holding a manually entered duration.
pub const TIME_PROPERTY: &str = "time";

/// Derived journal property: formatted total switching cost.
pub const SWITCHING_COST_PROPERTY: &str = "switching-cost";

/// Derived journal property: formatted total duration.
pub const TOTAL_DURATION_PROPERTY: &str = "total-duration";

/// Hard failures while reading a journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// No journal file exists for the date.
    #[error("no journal found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The journal file exists but could not be read.
    #[error("failed to read journal {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Severity of a [`Problem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A non-fatal finding from parsing or validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub severity: Severity,
    pub message: String,
}

impl Problem {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.to_string().to_uppercase(), self.message)
    }
}

#[derive(Debug, Default)]
enum JournalState {
    #[default]
    Unparsed,
    Parsed(Box<ParsedJournal>),
}

/// The journal for one calendar date.
#[derive(Debug)]
pub struct Journal {
    date: NaiveDate,
    path: PathBuf,
    state: JournalState,
}

impl Journal {
    pub fn new(graph_path: impl AsRef<Path>, date: NaiveDate) -> Self {
        Self {
            date,
            path: journal_path(graph_path.as_ref(), date),
            state: JournalState::Unparsed,
        }
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Location of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The result of the last successful parse.
    pub fn parsed(&self) -> Option<&ParsedJournal> {
        match &self.state {
            JournalState::Parsed(parsed) => Some(parsed),
            JournalState::Unparsed => None,
        }
    }

    pub const fn is_parsed(&self) -> bool {
        matches!(self.state, JournalState::Parsed(_))
    }

    /// Task blocks, once parsed.
    pub fn tasks(&self) -> Option<impl Iterator<Item = &Block> + '_> {
        self.parsed().map(ParsedJournal::tasks)
    }

    /// Problems found by the last parse.
    pub fn problems(&self) -> Option<&[Problem]> {
        self.parsed().map(ParsedJournal::problems)
    }

    /// Read and process the journal file, replacing any earlier result.
    ///
    /// On failure the journal is left unparsed.
    pub fn parse(&mut self, switching_cost: &SwitchingCost) -> Result<&ParsedJournal, JournalError> {
        self.state = JournalState::Unparsed;
        tracing::debug!(path = ?self.path, date = %self.date, "parsing journal");

        let outline = self.read_outline()?;
        let parsed = ParsedJournal::process(self.date, outline, switching_cost);
        tracing::debug!(
            tasks = parsed.task_ids().len(),
            problems = parsed.problems().len(),
            total_duration = parsed.total_duration(),
            switching_cost = parsed.total_switching_cost(),
            "parsed journal"
        );

        self.state = JournalState::Parsed(Box::new(parsed));
        match &self.state {
            JournalState::Parsed(parsed) => Ok(parsed),
            JournalState::Unparsed => unreachable!("journal state was just set"),
        }
    }

    fn read_outline(&self) -> Result<Outline, JournalError> {
        let file = File::open(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                JournalError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                JournalError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let mut builder = OutlineBuilder::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| JournalError::Io {
                path: self.path.clone(),
                source,
            })?;
            builder.push_line(&line);
        }
        Ok(builder.finish())
    }
}

/// Location of the journal file for `date` under `graph_path`.
pub fn journal_path(graph_path: &Path, date: NaiveDate) -> PathBuf {
    graph_path
        .join(JOURNALS_DIR)
        .join(format!("{}.md", date.format("%Y_%m_%d")))
}

/// A fully processed journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedJournal {
    date: NaiveDate,
    outline: Outline,
    tasks: Vec<BlockId>,
    /// Validation results taken before switching cost is allocated.
    validation: IndexMap<BlockId, ValidationErrors>,
    total_duration: u64,
    total_switching_cost: u64,
    properties: IndexMap<String, String>,
}

impl ParsedJournal {
    /// Process journal text that has already been read.
    pub fn from_text(date: NaiveDate, text: &str, switching_cost: &SwitchingCost) -> Self {
        Self::process(date, build_outline(text.lines()), switching_cost)
    }

    fn process(date: NaiveDate, outline: Outline, switching_cost: &SwitchingCost) -> Self {
        let tasks = find_tasks(&outline.tree);
        let mut journal = Self {
            date,
            outline,
            tasks,
            validation: IndexMap::new(),
            total_duration: 0,
            total_switching_cost: 0,
            properties: IndexMap::new(),
        };

        journal.convert_time_properties();
        journal.validate_tasks();
        journal.allocate_switching_cost(switching_cost);

        // The catch-all's total changes once switching cost is allocated, so
        // totals are taken afterwards.
        journal.total_duration = journal
            .tasks()
            .filter_map(Block::task)
            .map(TaskData::total_duration)
            .fold(0, u64::saturating_add);

        journal.properties.insert(
            SWITCHING_COST_PROPERTY.to_string(),
            format_duration(journal.total_switching_cost),
        );
        journal.properties.insert(
            TOTAL_DURATION_PROPERTY.to_string(),
            format_duration(journal.total_duration),
        );

        journal
    }

    /// Replace parseable `time::` properties with synthesized log entries.
    /// Unparseable values stay in place with a warning and fail validation
    /// later.
    fn convert_time_properties(&mut self) {
        for &id in &self.tasks {
            let block = self.outline.tree.get_mut(id);
            let Some(parsed) = block.property(TIME_PROPERTY).map(parse_free_duration) else {
                continue;
            };

            match parsed {
                Ok(seconds) => {
                    block.remove_property(TIME_PROPERTY);
                    if let Some(task) = block.task_mut() {
                        task.add_to_logbook(LogEntry::from_duration(
                            self.date,
                            round_duration(seconds),
                        ));
                    }
                }
                Err(err) => {
                    tracing::debug!(block = block.content(), error = %err, "keeping unparseable time property");
                    self.outline.problems.push(Problem::warning(format!(
                        "{}: unable to parse manual time ({err})",
                        block.content()
                    )));
                }
            }
        }
    }

    /// Estimate switching cost per task and log it against the catch-all.
    fn allocate_switching_cost(&mut self, switching_cost: &SwitchingCost) {
        let catch_all = self.outline.catch_all;

        let mut total: u64 = 0;
        for &id in &self.tasks {
            if Some(id) == catch_all {
                continue;
            }
            let Some(task) = self.outline.tree.get(id).task() else {
                continue;
            };
            let duration = task.total_duration();
            let cost = switching_cost.for_duration(duration).saturating_mul(60);
            tracing::trace!(?id, duration, cost, "task switching cost");
            total = total.saturating_add(cost);
        }

        self.total_switching_cost = round_duration(total);
        if self.total_switching_cost == 0 {
            return;
        }

        let entry = LogEntry::from_duration(self.date, self.total_switching_cost);
        match catch_all.and_then(|id| self.outline.tree.get_mut(id).task_mut()) {
            Some(task) => task.add_to_logbook(entry),
            None => self.outline.problems.push(Problem::warning(format!(
                "No catch-all task found: switching cost of {} is not included in the total duration.",
                format_duration(self.total_switching_cost)
            ))),
        }
    }

    fn validate_tasks(&mut self) {
        for &id in &self.tasks {
            let errors = validate(&self.outline.tree, id);
            let content = self.outline.tree.get(id).content();
            for (category, messages) in &errors {
                for message in messages {
                    self.outline.problems.push(Problem::error(format!(
                        "{content}: {message} [{category}]"
                    )));
                }
            }
            self.validation.insert(id, errors);
        }
    }

    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    pub const fn tree(&self) -> &BlockTree {
        &self.outline.tree
    }

    /// Task block handles in document order.
    pub fn task_ids(&self) -> &[BlockId] {
        &self.tasks
    }

    /// Task blocks in document order.
    pub fn tasks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.tasks.iter().map(|&id| self.outline.tree.get(id))
    }

    /// Validation errors found for task `id`. Empty when the task is valid.
    pub fn task_errors(&self, id: BlockId) -> Option<&ValidationErrors> {
        self.validation.get(&id)
    }

    /// The task that absorbs switching cost, if one was marked.
    pub fn catch_all(&self) -> Option<&Block> {
        self.outline.catch_all.map(|id| self.outline.tree.get(id))
    }

    pub fn problems(&self) -> &[Problem] {
        &self.outline.problems
    }

    /// Sum of every task's rounded duration, in seconds.
    pub const fn total_duration(&self) -> u64 {
        self.total_duration
    }

    /// Estimated switching cost, in seconds.
    pub const fn total_switching_cost(&self) -> u64 {
        self.total_switching_cost
    }

    /// Whether the switching cost is part of [`Self::total_duration`].
    pub const fn includes_switching_cost(&self) -> bool {
        self.outline.catch_all.is_some()
    }

    pub const fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}
