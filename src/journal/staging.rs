//! Staging Buffer and lock discipline
//!
//! While the journal is locked, revisions found by the poller are parked
//! here instead of becoming visible. `unlock` drains them into the
//! revision set in discovery order.
//!
//! The lock state and the buffer share one mutex. The revision set has its
//! own lock; the only nesting is staging -> set (poller batch apply), never
//! the other way around.
//!
//! Unlocking goes through a `Draining` state: the buffer mutex is released
//! while ids are merged into the set, but no new `lock()` can begin and the
//! poller keeps staging until the buffer has been observed empty.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::errors::{JournalError, JournalResult};
use super::revision::RevisionId;
use super::revision_set::RevisionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockState {
    Unlocked,
    Locked,
    /// `unlock()` is moving staged ids into the set
    Draining,
}

#[derive(Debug)]
struct StagingInner {
    state: LockState,
    pending: VecDeque<RevisionId>,
}

/// Where a poll batch went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Merged straight into the revision set; `added` ids were new
    Merged { added: usize },
    /// Parked in the staging buffer
    Staged { count: usize },
}

/// Lock flag plus the buffer of revisions hidden while locked.
#[derive(Debug)]
pub struct StagingBuffer {
    inner: Mutex<StagingInner>,
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl StagingBuffer {
    /// Create an unlocked, empty buffer.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StagingInner {
                state: LockState::Unlocked,
                pending: VecDeque::new(),
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, StagingInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether new revisions are currently hidden.
    pub fn is_locked(&self) -> bool {
        self.inner().state != LockState::Unlocked
    }

    /// Number of revisions waiting for `unlock`.
    pub fn pending_len(&self) -> usize {
        self.inner().pending.len()
    }

    /// Start hiding newly discovered revisions.
    pub fn lock(&self) -> JournalResult<()> {
        let mut inner = self.inner();
        if inner.state != LockState::Unlocked {
            return Err(JournalError::AlreadyLocked);
        }
        inner.state = LockState::Locked;
        Ok(())
    }

    /// Stop hiding revisions and merge everything staged, in FIFO order.
    ///
    /// Returns how many staged ids were new to the set.
    pub fn unlock(&self, set: &RevisionSet) -> JournalResult<usize> {
        {
            let mut inner = self.inner();
            if inner.state != LockState::Locked {
                return Err(JournalError::NotLocked);
            }
            inner.state = LockState::Draining;
        }
        Ok(self.drain(set))
    }

    /// Move staged ids into the set until the buffer is seen empty, then
    /// leave `Draining`. Batches staged meanwhile land after earlier ones.
    fn drain(&self, set: &RevisionSet) -> usize {
        let mut added = 0;
        loop {
            let drained: Vec<RevisionId> = {
                let mut inner = self.inner();
                if inner.pending.is_empty() {
                    inner.state = LockState::Unlocked;
                    return added;
                }
                inner.pending.drain(..).collect()
            };

            for id in drained {
                if set.merge(id) {
                    added += 1;
                }
            }
        }
    }

    /// Apply one poll batch: stage it if locked, merge it otherwise.
    ///
    /// The lock state cannot change while the batch is applied.
    pub fn apply_batch(&self, set: &RevisionSet, batch: &[RevisionId]) -> BatchOutcome {
        let mut inner = self.inner();
        if inner.state == LockState::Unlocked {
            BatchOutcome::Merged {
                added: set.merge_all(batch),
            }
        } else {
            inner.pending.extend(batch.iter().copied());
            BatchOutcome::Staged { count: batch.len() }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(id: u64) -> RevisionId {
        RevisionId::new(id)
    }

    #[test]
    fn test_lock_twice_fails() {
        let staging = StagingBuffer::new();
        assert!(staging.lock().is_ok());
        assert!(matches!(staging.lock(), Err(JournalError::AlreadyLocked)));
    }

    #[test]
    fn test_unlock_without_lock_fails() {
        let staging = StagingBuffer::new();
        let set = RevisionSet::new();
        assert!(matches!(staging.unlock(&set), Err(JournalError::NotLocked)));
    }

    #[test]
    fn test_unlocked_batch_merges() {
        let staging = StagingBuffer::new();
        let set = RevisionSet::new();

        let outcome = staging.apply_batch(&set, &[rev(1), rev(2)]);
        assert_eq!(outcome, BatchOutcome::Merged { added: 2 });
        assert_eq!(set.head(), rev(2));
        assert_eq!(staging.pending_len(), 0);
    }

    #[test]
    fn test_locked_batch_is_staged() {
        let staging = StagingBuffer::new();
        let set = RevisionSet::new();
        staging.lock().unwrap();

        let outcome = staging.apply_batch(&set, &[rev(1), rev(2)]);
        assert_eq!(outcome, BatchOutcome::Staged { count: 2 });
        assert_eq!(set.snapshot(), vec![RevisionId::ROOT]);
        assert_eq!(staging.pending_len(), 2);
    }

    #[test]
    fn test_unlock_drains_in_order() {
        let staging = StagingBuffer::new();
        let set = RevisionSet::new();
        staging.lock().unwrap();
        staging.apply_batch(&set, &[rev(30), rev(10)]);
        staging.apply_batch(&set, &[rev(20), rev(30)]);

        let added = staging.unlock(&set).unwrap();
        assert_eq!(added, 3);
        assert_eq!(set.snapshot(), vec![RevisionId::ROOT, rev(30), rev(10), rev(20)]);
        assert_eq!(set.head(), rev(20));
        assert!(!staging.is_locked());
        assert_eq!(staging.pending_len(), 0);
    }

    #[test]
    fn test_draining_refuses_lock_and_keeps_staging() {
        let staging = StagingBuffer::new();
        let set = RevisionSet::new();
        staging.lock().unwrap();
        staging.apply_batch(&set, &[rev(1), rev(2)]);

        // State as seen between unlock's transition and its final empty check
        staging.inner().state = LockState::Draining;

        assert!(matches!(staging.lock(), Err(JournalError::AlreadyLocked)));
        assert!(staging.is_locked());
        let outcome = staging.apply_batch(&set, &[rev(3)]);
        assert_eq!(outcome, BatchOutcome::Staged { count: 1 });
        assert_eq!(set.snapshot(), vec![RevisionId::ROOT]);

        assert_eq!(staging.drain(&set), 3);
        assert_eq!(set.snapshot(), vec![RevisionId::ROOT, rev(1), rev(2), rev(3)]);
        assert!(!staging.is_locked());
        assert!(staging.lock().is_ok());
    }

    #[test]
    fn test_concurrent_batches_during_unlock_keep_order() {
        use std::sync::Arc;
        use std::thread;

        let staging = Arc::new(StagingBuffer::new());
        let set = Arc::new(RevisionSet::new());
        staging.lock().unwrap();
        let first: Vec<RevisionId> = (1..=500).map(rev).collect();
        staging.apply_batch(&set, &first);

        let poller = {
            let staging = Arc::clone(&staging);
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for id in 501..=600 {
                    staging.apply_batch(&set, &[rev(id)]);
                }
            })
        };
        staging.unlock(&set).unwrap();
        poller.join().unwrap();

        let expected: Vec<RevisionId> = std::iter::once(RevisionId::ROOT)
            .chain((1..=600).map(rev))
            .collect();
        assert_eq!(set.snapshot(), expected);
        assert_eq!(staging.pending_len(), 0);
    }

    #[test]
    fn test_relock_after_unlock() {
        let staging = StagingBuffer::new();
        let set = RevisionSet::new();
        staging.lock().unwrap();
        staging.unlock(&set).unwrap();
        assert!(staging.lock().is_ok());
        assert!(staging.is_locked());
    }
}
