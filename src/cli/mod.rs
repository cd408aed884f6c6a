//! CLI module for the Appy catalog
//!
//! Provides command-line interface for:
//! - stats: Index the object dump and report catalog sizes
//! - search: Search a catalog, sorted and paged
//! - recompute: Rebuild indexes and report the changes
//! - show: Inspect an index

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, Source};
pub use commands::{execute, load, recompute, run, run_command, search, show, stats, Loaded};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_response, ok_response, write_error, write_response};
