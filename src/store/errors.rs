//! # Store Errors
//!
//! Error types reported by revision store adapters.

use std::io;

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Revision store errors
#[derive(Debug, Error)]
pub enum StoreError {
    // ==================
    // Store Dropped
    // ==================
    /// The backing table does not exist (anymore)
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The store refuses the operation permanently
    #[error("Operation must not be retried: {0}")]
    DoNotRetry(String),

    // ==================
    // Transient Errors
    // ==================
    /// I/O failure while talking to the store
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),

    /// A row could not be decoded
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// The store handle was already closed
    #[error("Store handle is closed")]
    Closed,
}

impl StoreError {
    /// Whether the error means the backing table is gone for good.
    ///
    /// A dropped store ends polling silently; every other error is
    /// retried on the next cycle.
    pub fn is_store_dropped(&self) -> bool {
        matches!(self, StoreError::TableNotFound(_) | StoreError::DoNotRetry(_))
    }
}
