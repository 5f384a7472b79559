//! Core parsing and aggregation for daily outline journals.
//!
//! This crate contains the fundamental types and logic for:
//! - Block tree: rebuilding the outline hierarchy from tab-indented lines
//! - Tasks: extracting keyword, ID and logged time from task blocks
//! - Durations: decoding, rounding and formatting logged time
//! - Switching cost: estimating context-switching overhead per task
//! - Journal: totalling one day's work and collecting problems

pub mod block;
pub mod duration;
pub mod journal;
pub mod logbook;
pub mod switching;
pub mod task;

pub use block::{Block, BlockId, BlockKind, BlockTree};
pub use duration::{format_duration, parse_clock_duration, parse_free_duration, round_duration};
pub use journal::{Journal, JournalError, ParsedJournal, Problem, Severity};
pub use logbook::LogEntry;
pub use switching::{SwitchingCost, SwitchingCostError};
pub use task::{TaskData, TaskKeyword, ValidationCategory, ValidationErrors, find_tasks, validate};
