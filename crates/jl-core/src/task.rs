//! Task blocks: extraction of keyword, identifier and description, and
//! validation of what they logged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::block::{BlockId, BlockTree};
use crate::duration::round_duration;
use crate::journal::TIME_PROPERTY;
use crate::logbook::{
    CLOCK_MARKER, DURATION_SEPARATOR, LOGBOOK_END, LOGBOOK_START, LogEntry, LogEntryError,
};

/// External task identifier, e.g. `ABC-123` or `ABC-123:`.
static TASK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+-\d+):?$").expect("task ID pattern is valid"));

/// Keyword opening a task block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskKeyword {
    /// A timer is currently running.
    Now,
    /// No timer is running.
    Later,
}

impl TaskKeyword {
    pub const ALL: [Self; 2] = [Self::Now, Self::Later];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Now => "NOW",
            Self::Later => "LATER",
        }
    }

    /// Split a recognised keyword (followed by a space) off `content`.
    fn strip(content: &str) -> Option<(Self, &str)> {
        Self::ALL.into_iter().find_map(|keyword| {
            content
                .strip_prefix(keyword.as_str())
                .and_then(|rest| rest.strip_prefix(' '))
                .map(|rest| (keyword, rest))
        })
    }
}

impl fmt::Display for TaskKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data carried by task blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskData {
    keyword: TaskKeyword,
    task_id: Option<String>,
    description: String,
    /// Most recent first.
    logbook: Vec<LogEntry>,
}

impl TaskData {
    /// Extract task fields from block content, if it opens with a keyword.
    pub fn from_content(content: &str) -> Option<Self> {
        let (keyword, rest) = TaskKeyword::strip(content)?;
        let rest = rest.trim();

        let (first, remainder) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));

        let (task_id, description) = match TASK_ID_RE.captures(first) {
            Some(caps) => (Some(caps[1].to_string()), remainder.trim()),
            None => (None, rest),
        };

        Some(Self {
            keyword,
            task_id,
            description: description.to_string(),
            logbook: Vec::new(),
        })
    }

    pub const fn keyword(&self) -> TaskKeyword {
        self.keyword
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn logbook(&self) -> &[LogEntry] {
        &self.logbook
    }

    /// Add an entry ahead of existing ones.
    pub fn add_to_logbook(&mut self, entry: LogEntry) {
        self.logbook.insert(0, entry);
    }

    /// Consume logbook sentinels and timer lines, returning anything else.
    ///
    /// Timer lines without a recorded duration (started and stopped in the
    /// same second) are dropped silently.
    pub(crate) fn take_logbook_line<'a>(
        &mut self,
        content: &'a str,
    ) -> Result<Option<&'a str>, LogEntryError> {
        if content == LOGBOOK_START || content == LOGBOOK_END {
            return Ok(None);
        }

        if content.starts_with(CLOCK_MARKER) {
            if content.contains(DURATION_SEPARATOR) {
                self.logbook.push(LogEntry::parse(content)?);
            }
            return Ok(None);
        }

        Ok(Some(content))
    }

    /// Sum of all logged seconds, unrounded. Saturates instead of wrapping.
    pub fn logged_seconds(&self) -> u64 {
        self.logbook
            .iter()
            .map(LogEntry::duration)
            .fold(0, u64::saturating_add)
    }

    /// Total logged time, rounded to the reporting interval.
    pub fn total_duration(&self) -> u64 {
        round_duration(self.logged_seconds())
    }
}

/// Category of a task validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    Keyword,
    TaskId,
    Duration,
}

impl fmt::Display for ValidationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Keyword => "keyword",
            Self::TaskId => "task_id",
            Self::Duration => "duration",
        };
        write!(f, "{s}")
    }
}

/// Validation errors by category. Empty when the task is valid.
pub type ValidationErrors = BTreeMap<ValidationCategory, Vec<String>>;

/// All task blocks in depth-first, parent-before-children order.
pub fn find_tasks(tree: &BlockTree) -> Vec<BlockId> {
    tree.descendants(BlockId::ROOT)
        .into_iter()
        .filter(|&id| tree.get(id).is_task())
        .collect()
}

/// Validate the task block `id`. Non-task blocks have no errors.
pub fn validate(tree: &BlockTree, id: BlockId) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let block = tree.get(id);
    let Some(task) = block.task() else {
        return errors;
    };

    let mut add = |category: ValidationCategory, message: String| {
        errors.entry(category).or_default().push(message);
    };

    if task.keyword() == TaskKeyword::Now {
        add(
            ValidationCategory::Keyword,
            "Task timer is still running (NOW); its duration cannot be determined.".to_string(),
        );
    }

    if tree.ancestors(id).any(|ancestor| tree.get(ancestor).is_task()) {
        add(
            ValidationCategory::Keyword,
            "Nested tasks are not supported.".to_string(),
        );
    }

    if task.task_id().is_none() {
        add(
            ValidationCategory::TaskId,
            "Task has no ID (expected e.g. ABC-123).".to_string(),
        );
    }

    if task.logbook().is_empty() {
        add(
            ValidationCategory::Duration,
            "No duration recorded.".to_string(),
        );
    }

    if let Some(raw) = block.property(TIME_PROPERTY) {
        add(
            ValidationCategory::Duration,
            format!("Unable to parse manual duration {raw:?} (expected e.g. \"1h 30m\")."),
        );
    }

    errors
}
