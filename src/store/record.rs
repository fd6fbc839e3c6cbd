//! Commit records as returned by a store scan

use serde::{Deserialize, Serialize};

use crate::journal::RevisionId;

/// One scanned journal row.
///
/// `committed_at` is the write timestamp (milliseconds since the Unix
/// epoch) of the row's committed flag. It is the ordering key of the
/// journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Revision the row belongs to
    pub revision_id: RevisionId,
    /// Whether the committed flag is set
    pub committed: bool,
    /// Last write time of the committed flag
    pub committed_at: i64,
}

impl CommitRecord {
    /// Create a committed record.
    pub fn committed(revision_id: RevisionId, committed_at: i64) -> Self {
        Self {
            revision_id,
            committed: true,
            committed_at,
        }
    }

    /// Create a record whose committed flag is unset or was reset.
    pub fn uncommitted(revision_id: RevisionId, written_at: i64) -> Self {
        Self {
            revision_id,
            committed: false,
            committed_at: written_at,
        }
    }
}
