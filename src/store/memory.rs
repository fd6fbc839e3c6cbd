//! In-memory revision store
//!
//! Keeps journal rows keyed by revision id, so scans come back in id
//! order like a key-ordered table scan. Supports the failure modes the
//! journal has to survive: transient scan errors and a dropped table.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::{StoreError, StoreResult};
use super::record::CommitRecord;
use super::RevisionStore;
use crate::journal::RevisionId;

#[derive(Debug, Clone, Copy)]
struct MemoryRow {
    written_at: i64,
    committed: bool,
    committed_at: i64,
}

#[derive(Debug, Default)]
struct MemoryTable {
    rows: BTreeMap<RevisionId, MemoryRow>,
    dropped: bool,
    closed: bool,
    failing_scans: usize,
    scans: u64,
}

/// Thread-safe in-memory `RevisionStore`.
#[derive(Debug, Default)]
pub struct MemoryRevisionStore {
    table: Mutex<MemoryTable>,
}

impl MemoryRevisionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, MemoryTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write an uncommitted row for `id`.
    pub fn put(&self, id: RevisionId, written_at: i64) {
        self.table().rows.insert(
            id,
            MemoryRow {
                written_at,
                committed: false,
                committed_at: written_at,
            },
        );
    }

    /// Set the committed flag of `id`. A missing row is written at the
    /// commit time.
    pub fn commit(&self, id: RevisionId, committed_at: i64) {
        let mut table = self.table();
        let row = table.rows.entry(id).or_insert(MemoryRow {
            written_at: committed_at,
            committed: false,
            committed_at,
        });
        row.committed = true;
        row.committed_at = committed_at;
    }

    /// Reset the committed flag of `id` (aborted try).
    pub fn abort(&self, id: RevisionId, at: i64) {
        if let Some(row) = self.table().rows.get_mut(&id) {
            row.committed = false;
            row.committed_at = at;
        }
    }

    /// Write and commit `id` in one step.
    pub fn insert_committed(&self, id: RevisionId, at: i64) {
        self.put(id, at);
        self.commit(id, at);
    }

    /// Drop the table. Every later scan fails with `TableNotFound`.
    pub fn drop_table(&self) {
        self.table().dropped = true;
    }

    /// Make the next `count` scans fail with an I/O error.
    pub fn fail_next_scans(&self, count: usize) {
        self.table().failing_scans = count;
    }

    /// Number of scans served so far, failed ones included.
    pub fn scan_count(&self) -> u64 {
        self.table().scans
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.table().closed
    }
}

impl RevisionStore for MemoryRevisionStore {
    fn scan(&self, lower_bound: Option<i64>) -> StoreResult<Vec<CommitRecord>> {
        let mut table = self.table();
        table.scans += 1;

        if table.closed {
            return Err(StoreError::Closed);
        }
        if table.dropped {
            return Err(StoreError::TableNotFound("journal".into()));
        }
        if table.failing_scans > 0 {
            table.failing_scans -= 1;
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "injected scan failure",
            )));
        }

        let records = table
            .rows
            .iter()
            .filter(|(_, row)| lower_bound.map_or(true, |bound| row.written_at >= bound))
            .map(|(id, row)| CommitRecord {
                revision_id: *id,
                committed: row.committed,
                committed_at: row.committed_at,
            })
            .collect();
        Ok(records)
    }

    fn close(&self) -> StoreResult<()> {
        let mut table = self.table();
        if table.closed {
            return Err(StoreError::Closed);
        }
        table.closed = true;
        Ok(())
    }
}
