//! Subcommand implementations.

pub mod clean;
pub mod common;
pub mod completions;
pub mod config;
pub mod install;
pub mod status;
