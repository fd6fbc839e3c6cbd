//! # Journal Errors
//!
//! Errors surfaced to journal callers. Poll-cycle failures never show up
//! here: they are logged and retried, or they end polling silently.

use thiserror::Error;

use super::revision::RevisionId;
use crate::store::StoreError;

/// Result type for journal operations
pub type JournalResult<T> = Result<T, JournalError>;

/// Journal errors
#[derive(Debug, Error)]
pub enum JournalError {
    // ==================
    // Query Errors
    // ==================
    /// Revision was never observed by this journal
    #[error("Unknown revision id {0}")]
    UnknownRevision(RevisionId),

    // ==================
    // Commit Protocol Errors
    // ==================
    /// `lock()` while already locked
    #[error("Journal is already locked")]
    AlreadyLocked,

    /// `unlock()` while not locked
    #[error("Journal is not locked")]
    NotLocked,

    // ==================
    // Lifecycle Errors
    // ==================
    /// Store failure during open or close
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Poller thread could not be started
    #[error("Failed to start poller: {0}")]
    Spawn(String),
}

impl JournalError {
    /// Whether the error is a violation of the lock/unlock protocol by the caller.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, JournalError::AlreadyLocked | JournalError::NotLocked)
    }
}
