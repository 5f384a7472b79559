//! CLI subcommand implementations.

pub mod summary;
pub mod util;
pub mod worklog;
