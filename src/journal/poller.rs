//! Background Poller
//!
//! One cycle:
//! 1. Pick the scan lower bound: everything on the first cycle, otherwise
//!    the previous cycle's start time minus the grace period. The start
//!    time is taken before scanning.
//! 2. Scan, keep committed rows only.
//! 3. Stable-sort by commit-flag timestamp.
//! 4. Merge the batch, or stage it if the journal is locked.
//! 5. Signal cycle completion.
//!
//! Between cycles the poller sleeps for the poll interval or until woken.
//! A dropped store ends the poller silently; any other scan failure is
//! logged and retried on the next cycle.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::gate::SyncGate;
use super::revision::RevisionId;
use super::revision_set::RevisionSet;
use super::staging::{BatchOutcome, StagingBuffer};
use crate::observability::{log_event_with_fields, Event, JournalMetrics};
use crate::store::{now_millis, CommitRecord, RevisionStore, StoreResult};

/// State shared between the journal handle and its poller.
#[derive(Debug)]
pub(crate) struct JournalState {
    pub(crate) id: String,
    pub(crate) set: RevisionSet,
    pub(crate) staging: StagingBuffer,
    pub(crate) gate: SyncGate,
    pub(crate) metrics: JournalMetrics,
}

impl JournalState {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            set: RevisionSet::new(),
            staging: StagingBuffer::new(),
            gate: SyncGate::new(),
            metrics: JournalMetrics::new(),
        }
    }
}

/// Marks the gate stopped when the poller exits, panics included.
struct StopOnExit {
    state: Arc<JournalState>,
}

impl Drop for StopOnExit {
    fn drop(&mut self) {
        if thread::panicking() {
            log_event_with_fields(Event::PollerPanicked, &[("journal", self.state.id.as_str())]);
        }
        self.state.gate.mark_stopped();
    }
}

/// Committed revisions of a scan, ordered by commit time.
///
/// Rows with an unset committed flag are dropped. Equal timestamps keep
/// their scan order.
pub fn order_by_commit_time(records: Vec<CommitRecord>) -> Vec<RevisionId> {
    let mut committed: Vec<(i64, RevisionId)> = records
        .into_iter()
        .filter(|record| record.committed)
        .map(|record| (record.committed_at, record.revision_id))
        .collect();
    committed.sort_by_key(|(committed_at, _)| *committed_at);
    committed.into_iter().map(|(_, id)| id).collect()
}

pub(crate) struct Poller {
    store: Arc<dyn RevisionStore>,
    state: Arc<JournalState>,
    poll_interval: Duration,
    grace_period_ms: i64,
    clock: fn() -> i64,
    /// Start time of the last successful scan; poller-private
    last_scan_start: Option<i64>,
}

impl Poller {
    pub(crate) fn new(
        store: Arc<dyn RevisionStore>,
        state: Arc<JournalState>,
        poll_interval: Duration,
        grace_period: Duration,
    ) -> Self {
        Self {
            store,
            state,
            poll_interval,
            grace_period_ms: i64::try_from(grace_period.as_millis()).unwrap_or(i64::MAX),
            clock: now_millis,
            last_scan_start: None,
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    fn scan_lower_bound(&self) -> Option<i64> {
        self.last_scan_start
            .map(|start| start.saturating_sub(self.grace_period_ms))
    }

    /// Run one full cycle and signal its completion.
    pub(crate) fn cycle(&mut self) -> StoreResult<()> {
        self.state.gate.begin_cycle();
        let result = self.scan_and_apply();
        self.state.metrics.increment_cycles();
        self.state.gate.complete_cycle();
        result
    }

    fn scan_and_apply(&mut self) -> StoreResult<()> {
        let lower_bound = self.scan_lower_bound();
        let started_at = (self.clock)();

        let records = self.store.scan(lower_bound)?;
        self.last_scan_start = Some(started_at);

        let batch = order_by_commit_time(records);
        if batch.is_empty() {
            return Ok(());
        }

        match self.state.staging.apply_batch(&self.state.set, &batch) {
            BatchOutcome::Merged { added } => {
                if added > 0 {
                    self.state.metrics.add_merged(added as u64);
                    log_event_with_fields(
                        Event::RevisionsMerged,
                        &[
                            ("journal", self.state.id.as_str()),
                            ("added", added.to_string().as_str()),
                            ("head", self.state.set.head().to_string().as_str()),
                        ],
                    );
                }
            }
            BatchOutcome::Staged { count } => {
                self.state.metrics.add_staged(count as u64);
                log_event_with_fields(
                    Event::RevisionsStaged,
                    &[("journal", self.state.id.as_str()), ("count", count.to_string().as_str())],
                );
            }
        }
        Ok(())
    }

    /// Poll until a stop is requested or the store is dropped.
    pub(crate) fn run(mut self) {
        let _stop = StopOnExit {
            state: Arc::clone(&self.state),
        };
        log_event_with_fields(Event::PollerStarted, &[("journal", self.state.id.as_str())]);

        while !self.state.gate.stop_requested() {
            if let Err(e) = self.cycle() {
                if e.is_store_dropped() {
                    log_event_with_fields(
                        Event::StoreDropped,
                        &[("journal", self.state.id.as_str()), ("error", e.to_string().as_str())],
                    );
                    break;
                }
                self.state.metrics.increment_scan_failures();
                log_event_with_fields(
                    Event::ScanFailed,
                    &[("journal", self.state.id.as_str()), ("error", e.to_string().as_str())],
                );
            }

            if self.state.gate.sleep(self.poll_interval) {
                break;
            }
        }

        log_event_with_fields(Event::PollerStopped, &[("journal", self.state.id.as_str())]);
    }
}
