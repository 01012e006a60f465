//! CLI module for axis
//!
//! Provides command-line interface for:
//! - init: Create the record directories
//! - serve: Run the HTTP API
//! - execute: One-shot contract execution

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, init, run, run_command, serve};
pub use config::AxisConfig;
pub use errors::{CliError, CliErrorCode, CliResult};
