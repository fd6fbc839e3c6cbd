//! CLI argument definitions using clap
//!
//! Commands:
//! - revjournal init --table <path>
//! - revjournal commit --table <path> --id <id>
//! - revjournal snapshot --table <path> [--config <path>] [--upto <id>]
//! - revjournal watch --table <path> [--config <path>] [--cycles <n>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// revjournal - ordered revision journal over a scan-only store
#[derive(Parser, Debug)]
#[command(name = "revjournal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log poll cycles and lifecycle events to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty journal table file
    Init {
        /// Path to the journal table (JSON lines)
        #[arg(long)]
        table: PathBuf,
    },

    /// Append a committed revision row, written and committed now
    Commit {
        /// Path to the journal table (JSON lines)
        #[arg(long)]
        table: PathBuf,

        /// Revision id to commit
        #[arg(long)]
        id: u64,
    },

    /// Print the ordered journal
    Snapshot {
        /// Path to the journal table (JSON lines)
        #[arg(long)]
        table: PathBuf,

        /// Path to journal configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only print revisions up to and including this id
        #[arg(long)]
        upto: Option<u64>,
    },

    /// Print a line every time the head moves
    Watch {
        /// Path to the journal table (JSON lines)
        #[arg(long)]
        table: PathBuf,

        /// Path to journal configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop after this many poll cycles (default: until the table is dropped)
        #[arg(long)]
        cycles: Option<u64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
