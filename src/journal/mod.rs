//! Revision Journal
//!
//! Keeps an ordered view of committed revisions over a store that only
//! offers eventually-visible scans.
//!
//! This module provides:
//! - `RevisionId` - Opaque revision identity, `ROOT` sentinel first
//! - `RevisionSet` - Grow-only ordered set plus head
//! - `StagingBuffer` - Revisions hidden while a writer holds the lock
//! - `SyncGate` - Forced refresh and cycle-completion broadcast
//! - `Journal` - Public handle running the background poller
//!
//! # Ordering
//!
//! Revisions become visible in the order their committed flags were
//! written. Neither id order nor scan order decides; ties keep scan order.

mod config;
mod errors;
mod gate;
mod handle;
mod poller;
mod revision;
mod revision_set;
mod staging;

pub use config::{JournalConfig, DEFAULT_GRACE_PERIOD_MS, DEFAULT_POLL_INTERVAL_MS};
pub use errors::{JournalError, JournalResult};
pub use gate::SyncGate;
pub use handle::Journal;
pub use poller::order_by_commit_time;
pub use revision::RevisionId;
pub use revision_set::RevisionSet;
pub use staging::{BatchOutcome, StagingBuffer};
