//! Journal - the public handle
//!
//! Owns the revision set, the staging buffer, the gate and the poller
//! thread. Shutdown order is fixed: stop the poller, join it, then close
//! the store, so no cycle in flight can touch a closed handle.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use uuid::Uuid;

use super::config::JournalConfig;
use super::errors::{JournalError, JournalResult};
use super::poller::{JournalState, Poller};
use super::revision::RevisionId;
use crate::observability::{log_event_with_fields, Event, MetricsSnapshot};
use crate::store::RevisionStore;

/// Ordered, point-in-time-consistent view of committed revisions.
pub struct Journal {
    state: Arc<JournalState>,
    store: Arc<dyn RevisionStore>,
    poller: Option<JoinHandle<()>>,
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("id", &self.state.id)
            .field("head", &self.state.set.head())
            .field("polling", &self.is_polling())
            .finish()
    }
}

impl Journal {
    /// Open a journal over `store`.
    ///
    /// The first scan runs synchronously, so the returned journal already
    /// holds every revision committed so far. A failing first scan fails
    /// the open.
    pub fn open(store: Arc<dyn RevisionStore>, config: JournalConfig) -> JournalResult<Self> {
        config.validate()?;

        let state = Arc::new(JournalState::new(Uuid::new_v4().to_string()));
        let mut poller = Poller::new(
            Arc::clone(&store),
            Arc::clone(&state),
            config.poll_interval(),
            config.grace_period(),
        );
        poller.cycle()?;

        let handle = thread::Builder::new()
            .name("revjournal-poller".into())
            .spawn(move || poller.run())
            .map_err(|e| JournalError::Spawn(e.to_string()))?;

        log_event_with_fields(
            Event::JournalOpen,
            &[
                ("journal", state.id.as_str()),
                ("head", state.set.head().to_string().as_str()),
                ("poll_interval_ms", config.poll_interval_ms.to_string().as_str()),
                ("grace_period_ms", config.grace_period_ms.to_string().as_str()),
            ],
        );

        Ok(Self {
            state,
            store,
            poller: Some(handle),
        })
    }

    /// Instance id used in log lines.
    pub fn id(&self) -> &str {
        &self.state.id
    }

    // ==================== Reads ====================

    /// The most recently merged revision.
    pub fn head(&self) -> RevisionId {
        self.state.set.head()
    }

    /// Every visible revision, in journal order.
    pub fn snapshot(&self) -> Vec<RevisionId> {
        self.state.set.snapshot()
    }

    /// Visible revisions up to and including `id`.
    pub fn snapshot_upto(&self, id: RevisionId) -> JournalResult<Vec<RevisionId>> {
        self.state.set.snapshot_upto(id)
    }

    /// Whether `id` is visible.
    pub fn contains(&self, id: RevisionId) -> bool {
        self.state.set.contains(id)
    }

    // ==================== Writes ====================

    /// Make `id` visible now. Used by a writer that has just committed it.
    ///
    /// Bypasses the lock: the writer knows what it committed.
    pub fn merge(&self, id: RevisionId) {
        if self.state.set.merge(id) {
            self.state.metrics.add_merged(1);
        }
    }

    /// Hide newly discovered revisions until `unlock`.
    pub fn lock(&self) -> JournalResult<()> {
        self.state.staging.lock()?;
        log_event_with_fields(Event::JournalLocked, &[("journal", self.state.id.as_str())]);
        Ok(())
    }

    /// Make every revision staged while locked visible, in discovery order.
    pub fn unlock(&self) -> JournalResult<()> {
        let added = self.state.staging.unlock(&self.state.set)?;
        self.state.metrics.add_merged(added as u64);
        log_event_with_fields(
            Event::JournalUnlocked,
            &[
                ("journal", self.state.id.as_str()),
                ("added", added.to_string().as_str()),
            ],
        );
        Ok(())
    }

    /// Whether the journal is locked.
    pub fn is_locked(&self) -> bool {
        self.state.staging.is_locked()
    }

    // ==================== Synchronization ====================

    /// Wake the poller and block until a cycle started after this call
    /// has completed. Returns immediately once polling has ended.
    pub fn force_refresh_and_wait(&self) {
        self.state.gate.force_refresh_and_wait();
    }

    /// Whether the poller is still running.
    pub fn is_polling(&self) -> bool {
        !self.state.gate.is_stopped()
    }

    /// Current counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.state.metrics.snapshot()
    }

    // ==================== Lifecycle ====================

    /// Stop the poller, wait for it to exit, then close the store.
    pub fn dispose(mut self) -> JournalResult<()> {
        self.stop_poller();
        self.store.close()?;
        log_event_with_fields(Event::JournalDisposed, &[("journal", self.state.id.as_str())]);
        Ok(())
    }

    fn stop_poller(&mut self) {
        if let Some(handle) = self.poller.take() {
            self.state.gate.request_stop();
            let _ = handle.join();
            // Already done by the poller on exit; repeated for a thread that never ran
            self.state.gate.mark_stopped();
        }
    }
}

impl Drop for Journal {
    fn drop(&mut self) {
        self.stop_poller();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRevisionStore;

    fn rev(id: u64) -> RevisionId {
        RevisionId::new(id)
    }

    fn open(store: &Arc<MemoryRevisionStore>) -> Journal {
        Journal::open(store.clone(), JournalConfig::with_poll_interval(50)).unwrap()
    }

    #[test]
    fn test_fresh_journal() {
        let store = Arc::new(MemoryRevisionStore::new());
        let journal = open(&store);
        assert_eq!(journal.snapshot(), vec![RevisionId::ROOT]);
        assert_eq!(journal.head(), RevisionId::ROOT);
        assert!(journal.is_polling());
        assert!(!journal.is_locked());
        journal.dispose().unwrap();
    }

    #[test]
    fn test_open_sees_existing_commits() {
        let store = Arc::new(MemoryRevisionStore::new());
        store.insert_committed(rev(11), 200);
        store.insert_committed(rev(10), 100);
        store.put(rev(12), 300);

        let journal = open(&store);
        assert_eq!(journal.snapshot(), vec![RevisionId::ROOT, rev(10), rev(11)]);
        assert_eq!(journal.head(), rev(11));
        journal.dispose().unwrap();
    }

    #[test]
    fn test_open_fails_on_dropped_store() {
        let store = Arc::new(MemoryRevisionStore::new());
        store.drop_table();
        let result = Journal::open(store, JournalConfig::default());
        assert!(matches!(result, Err(JournalError::Store(_))));
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let store = Arc::new(MemoryRevisionStore::new());
        let result = Journal::open(store, JournalConfig::with_poll_interval(0));
        assert!(matches!(result, Err(JournalError::Config(_))));
    }

    #[test]
    fn test_dispose_closes_store_after_poller() {
        let store = Arc::new(MemoryRevisionStore::new());
        let journal = open(&store);
        journal.dispose().unwrap();
        assert!(store.is_closed());
    }

    #[test]
    fn test_drop_stops_poller_without_closing() {
        let store = Arc::new(MemoryRevisionStore::new());
        let journal = open(&store);
        drop(journal);
        assert!(!store.is_closed());
        // No poller left to scan
        let scans = store.scan_count();
        std::thread::sleep(std::time::Duration::from_millis(120));
        assert_eq!(store.scan_count(), scans);
    }

    #[test]
    fn test_direct_merge_bypasses_lock() {
        let store = Arc::new(MemoryRevisionStore::new());
        let journal = open(&store);
        journal.lock().unwrap();
        journal.merge(rev(5));
        assert_eq!(journal.head(), rev(5));
        journal.unlock().unwrap();
        journal.dispose().unwrap();
    }

    #[test]
    fn test_debug_output() {
        let store = Arc::new(MemoryRevisionStore::new());
        let journal = open(&store);
        let debug = format!("{:?}", journal);
        assert!(debug.contains("Journal"));
        assert!(debug.contains(journal.id()));
        journal.dispose().unwrap();
    }
}
