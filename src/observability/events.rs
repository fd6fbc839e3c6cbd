//! Observable journal events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in a journal's life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Journal opened, initial scan done
    JournalOpen,
    /// Journal disposed, store closed
    JournalDisposed,
    /// Poller thread running
    PollerStarted,
    /// Poller thread exited
    PollerStopped,
    /// Poller thread died from a panic
    PollerPanicked,

    // Polling
    /// A scan failed and will be retried
    ScanFailed,
    /// The backing table is gone; polling ends
    StoreDropped,
    /// A poll batch became visible
    RevisionsMerged,
    /// A poll batch was hidden behind the lock
    RevisionsStaged,

    // Commit protocol
    /// Journal locked by a writer
    JournalLocked,
    /// Journal unlocked, staged revisions visible
    JournalUnlocked,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::JournalOpen => "JOURNAL_OPEN",
            Event::JournalDisposed => "JOURNAL_DISPOSED",
            Event::PollerStarted => "POLLER_STARTED",
            Event::PollerStopped => "POLLER_STOPPED",
            Event::PollerPanicked => "POLLER_PANICKED",
            Event::ScanFailed => "SCAN_FAILED",
            Event::StoreDropped => "STORE_DROPPED",
            Event::RevisionsMerged => "REVISIONS_MERGED",
            Event::RevisionsStaged => "REVISIONS_STAGED",
            Event::JournalLocked => "JOURNAL_LOCKED",
            Event::JournalUnlocked => "JOURNAL_UNLOCKED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ScanFailed => Severity::Warn,
            Event::PollerPanicked => Severity::Error,
            Event::RevisionsMerged
            | Event::RevisionsStaged
            | Event::JournalLocked
            | Event::JournalUnlocked => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
