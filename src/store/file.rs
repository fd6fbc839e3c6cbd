//! JSON-lines file revision store
//!
//! One JSON object per line. A later line for the same revision replaces
//! the earlier one, so committing a revision is an append of the same
//! row with `committed: true`. Every scan re-reads the file, which makes
//! rows appended by other processes visible on the next scan.
//!
//! A missing file is reported as `TableNotFound`: deleting the file is
//! how a table is dropped.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::record::CommitRecord;
use super::RevisionStore;
use crate::journal::RevisionId;

/// On-disk row format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRow {
    /// Revision the row belongs to
    pub revision_id: RevisionId,
    /// Row write time (scan key time)
    pub written_at: i64,
    /// Committed flag
    #[serde(default)]
    pub committed: bool,
    /// Last write time of the committed flag
    #[serde(default)]
    pub committed_at: i64,
}

/// `RevisionStore` backed by a JSON-lines file.
#[derive(Debug)]
pub struct FileRevisionStore {
    path: PathBuf,
    closed: AtomicBool,
}

impl FileRevisionStore {
    /// Open a store over an existing table file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(StoreError::TableNotFound(path.display().to_string()));
        }
        Ok(Self {
            path,
            closed: AtomicBool::new(false),
        })
    }

    /// Create the table file if it does not exist, then open it.
    pub fn create(path: impl AsRef<Path>) -> StoreResult<Self> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Self::open(path)
    }

    /// Path of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row to the table.
    pub fn append(&self, row: &FileRow) -> StoreResult<()> {
        append_row(&self.path, row)
    }

    fn read_rows(&self) -> StoreResult<BTreeMap<RevisionId, FileRow>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::TableNotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut rows = BTreeMap::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: FileRow = serde_json::from_str(line)
                .map_err(|e| StoreError::Corrupt(format!("line {}: {}", index + 1, e)))?;
            rows.insert(row.revision_id, row);
        }
        Ok(rows)
    }
}

/// Append a row to a table file without opening a store.
pub(crate) fn append_row(path: &Path, row: &FileRow) -> StoreResult<()> {
    let mut line = serde_json::to_string(row)
        .map_err(|e| StoreError::Corrupt(format!("unencodable row: {}", e)))?;
    line.push('\n');

    let mut file = OpenOptions::new().append(true).open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::TableNotFound(path.display().to_string())
        } else {
            StoreError::Io(e)
        }
    })?;
    file.write_all(line.as_bytes())?;
    file.flush()?;
    Ok(())
}

impl RevisionStore for FileRevisionStore {
    fn scan(&self, lower_bound: Option<i64>) -> StoreResult<Vec<CommitRecord>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }

        let records = self
            .read_rows()?
            .into_values()
            .filter(|row| lower_bound.map_or(true, |bound| row.written_at >= bound))
            .map(|row| CommitRecord {
                revision_id: row.revision_id,
                committed: row.committed,
                committed_at: row.committed_at,
            })
            .collect();
        Ok(records)
    }

    fn close(&self) -> StoreResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}
