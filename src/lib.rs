//! revjournal - an ordered revision journal over scan-only stores
//!
//! Discovers committed revisions by polling, orders them by commit time
//! and lets writers hide new revisions for the duration of a commit.

pub mod cli;
pub mod journal;
pub mod observability;
pub mod store;

pub use journal::{Journal, JournalConfig, JournalError, JournalResult, RevisionId};
pub use store::{CommitRecord, RevisionStore, StoreError, StoreResult};
