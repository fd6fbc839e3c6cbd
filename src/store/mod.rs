//! Revision store adapters
//!
//! The journal never talks to a concrete backend. It consumes a
//! `RevisionStore`, which offers exactly two things:
//! - an incremental, eventually-visible scan of commit records
//! - a one-shot `close()` of the underlying handle
//!
//! # Scan Lower Bound
//!
//! The lower bound passed to `scan` is a wall-clock time in milliseconds.
//! Adapters filter on the time a row was *written*, which is the time
//! the revision id was derived from. A commit whose flag is flipped long
//! after its row was written is therefore only found again if the lower
//! bound reaches back far enough; the journal's grace period covers that.

mod errors;
mod file;
mod memory;
mod record;

pub use errors::{StoreError, StoreResult};
pub use file::{FileRevisionStore, FileRow};
pub use memory::MemoryRevisionStore;
pub use record::CommitRecord;

use chrono::Utc;

/// Scan-based access to committed revisions.
pub trait RevisionStore: Send + Sync {
    /// Scan rows written at or after `lower_bound` (milliseconds since the
    /// Unix epoch). `None` scans everything.
    ///
    /// Results are returned in scan order. Uncommitted rows are included;
    /// filtering is the caller's business.
    fn scan(&self, lower_bound: Option<i64>) -> StoreResult<Vec<CommitRecord>>;

    /// Release the store handle. Called once, after polling has stopped.
    fn close(&self) -> StoreResult<()>;
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
