//! CLI module for revjournal
//!
//! Provides command-line interface for:
//! - init: Create an empty journal table
//! - commit: Append a committed revision
//! - snapshot: Print the ordered journal
//! - watch: Follow the head as revisions are committed

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{commit, init, run, run_command, snapshot, watch};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_response, write_value};
