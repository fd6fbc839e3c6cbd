//! CLI command implementations
//!
//! Every journal-backed command opens its own journal over the table
//! file and disposes it before returning.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use serde_json::json;

use crate::journal::{Journal, JournalConfig, RevisionId};
use crate::observability::{Logger, Severity};
use crate::store::{now_millis, FileRevisionStore, FileRow};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{write_response, write_value};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    Logger::set_min_severity(if cli.verbose {
        Severity::Trace
    } else {
        Severity::Warn
    });
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { table } => init(&table),
        Command::Commit { table, id } => commit(&table, RevisionId::new(id)),
        Command::Snapshot {
            table,
            config,
            upto,
        } => snapshot(&table, config.as_deref(), upto.map(RevisionId::new)),
        Command::Watch {
            table,
            config,
            cycles,
        } => watch(&table, config.as_deref(), cycles),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<JournalConfig> {
    match path {
        Some(path) => Ok(JournalConfig::load(path)?),
        None => Ok(JournalConfig::default()),
    }
}

fn open_journal(table: &Path, config: JournalConfig) -> CliResult<Journal> {
    let store = FileRevisionStore::open(table)?;
    Ok(Journal::open(Arc::new(store), config)?)
}

/// Create an empty table file
pub fn init(table: &Path) -> CliResult<()> {
    if table.exists() {
        return Err(CliError::io_error(format!(
            "Table already exists: {}",
            table.display()
        )));
    }
    let store = FileRevisionStore::create(table)?;
    write_response(json!({ "table": store.path().display().to_string() }))
}

/// Append a row that is written and committed now
pub fn commit(table: &Path, id: RevisionId) -> CliResult<()> {
    if id.is_root() {
        return Err(CliError::io_error("Revision 0 is reserved for the root"));
    }
    let store = FileRevisionStore::open(table)?;
    let now = now_millis();
    store.append(&FileRow {
        revision_id: id,
        written_at: now,
        committed: true,
        committed_at: now,
    })?;
    write_response(json!({ "revision_id": id, "committed_at": now }))
}

/// Print the ordered journal, optionally cut at `upto`
pub fn snapshot(table: &Path, config: Option<&Path>, upto: Option<RevisionId>) -> CliResult<()> {
    let journal = open_journal(table, load_config(config)?)?;

    let revisions = match upto {
        Some(id) => journal.snapshot_upto(id),
        None => Ok(journal.snapshot()),
    };
    let head = journal.head();
    journal.dispose()?;

    let revisions = revisions?;
    write_response(json!({ "head": head, "revisions": revisions }))
}

/// Print the head every time it moves
pub fn watch(table: &Path, config: Option<&Path>, cycles: Option<u64>) -> CliResult<()> {
    let config = load_config(config)?;
    let interval = config.poll_interval();
    let journal = open_journal(table, config)?;

    let mut head = journal.head();
    write_value(&json!({ "head": head, "revisions": journal.snapshot().len() }))?;

    let mut remaining = cycles;
    while remaining != Some(0) && journal.is_polling() {
        thread::sleep(interval);
        journal.force_refresh_and_wait();

        let current = journal.head();
        if current != head {
            head = current;
            write_value(&json!({ "head": head, "revisions": journal.snapshot().len() }))?;
        }
        remaining = remaining.map(|n| n - 1);
    }

    let polling = journal.is_polling();
    journal.dispose()?;
    if !polling {
        write_value(&json!({ "status": "table_dropped" }))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RevisionStore;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_commit() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("journal.jsonl");

        init(&table).unwrap();
        commit(&table, RevisionId::new(42)).unwrap();

        let store = FileRevisionStore::open(&table).unwrap();
        let records = store.scan(None).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].committed);
        assert_eq!(records[0].revision_id, RevisionId::new(42));
    }

    #[test]
    fn test_init_refuses_existing_table() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("journal.jsonl");
        init(&table).unwrap();
        assert!(init(&table).is_err());
    }

    #[test]
    fn test_commit_rejects_root() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("journal.jsonl");
        init(&table).unwrap();
        assert!(commit(&table, RevisionId::ROOT).is_err());
    }

    #[test]
    fn test_snapshot_unknown_revision() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("journal.jsonl");
        init(&table).unwrap();

        let err = snapshot(&table, None, Some(RevisionId::new(5))).unwrap_err();
        assert!(err.message().contains("Unknown revision id 5"));
    }

    #[test]
    fn test_snapshot_missing_table() {
        let dir = TempDir::new().unwrap();
        let err = snapshot(&dir.path().join("missing.jsonl"), None, None).unwrap_err();
        assert_eq!(err.code_str(), "REVJOURNAL_CLI_STORE_ERROR");
    }

    #[test]
    fn test_watch_bounded_cycles() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("journal.jsonl");
        let config = dir.path().join("journal.json");
        std::fs::write(&config, r#"{"poll_interval_ms": 10}"#).unwrap();
        init(&table).unwrap();

        watch(&table, Some(&config), Some(2)).unwrap();
    }
}
