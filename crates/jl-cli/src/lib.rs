//! Journal worklog CLI library.
//!
//! This crate provides the command-line interface over `jl-core`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, DayArgs};
pub use config::{Config, ConfigError, Settings};
