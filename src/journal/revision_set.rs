//! Revision Set - ordered, grow-only set of visible revisions
//!
//! Invariants:
//! - `RevisionId::ROOT` is always the first element
//! - an id, once present, is never removed or moved
//! - `head` is the most recently added id and is always an element
//!
//! The ordered list, the membership index and the head live behind one
//! lock, so a reader never sees a head that is not in the set.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::errors::{JournalError, JournalResult};
use super::revision::RevisionId;

#[derive(Debug)]
struct RevisionSetInner {
    /// Ids in discovery order
    order: Vec<RevisionId>,
    /// Membership index over `order`
    members: HashSet<RevisionId>,
    head: RevisionId,
}

/// Ordered set of committed revision ids plus the current head.
#[derive(Debug)]
pub struct RevisionSet {
    inner: RwLock<RevisionSetInner>,
}

impl Default for RevisionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionSet {
    /// Create a set holding only the root sentinel.
    pub fn new() -> Self {
        let mut members = HashSet::new();
        members.insert(RevisionId::ROOT);
        Self {
            inner: RwLock::new(RevisionSetInner {
                order: vec![RevisionId::ROOT],
                members,
                head: RevisionId::ROOT,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RevisionSetInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RevisionSetInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recently added revision.
    pub fn head(&self) -> RevisionId {
        self.read().head
    }

    /// Whether `id` is part of the set.
    pub fn contains(&self, id: RevisionId) -> bool {
        self.read().members.contains(&id)
    }

    /// Copy of the full ordered set.
    pub fn snapshot(&self) -> Vec<RevisionId> {
        self.read().order.clone()
    }

    /// Prefix of the ordered set ending at and including `target`.
    pub fn snapshot_upto(&self, target: RevisionId) -> JournalResult<Vec<RevisionId>> {
        let snapshot = self.snapshot();
        match snapshot.iter().position(|id| *id == target) {
            Some(index) => {
                let mut prefix = snapshot;
                prefix.truncate(index + 1);
                Ok(prefix)
            }
            None => Err(JournalError::UnknownRevision(target)),
        }
    }

    /// Append `id` and make it the head, unless it is already present.
    ///
    /// Returns whether the id was added.
    pub fn merge(&self, id: RevisionId) -> bool {
        let mut inner = self.write();
        Self::merge_locked(&mut inner, id)
    }

    /// Merge a batch in order under a single write lock.
    ///
    /// Returns how many ids were new.
    pub fn merge_all(&self, ids: &[RevisionId]) -> usize {
        let mut inner = self.write();
        ids.iter()
            .filter(|id| Self::merge_locked(&mut inner, **id))
            .count()
    }

    fn merge_locked(inner: &mut RevisionSetInner, id: RevisionId) -> bool {
        if !inner.members.insert(id) {
            return false;
        }
        inner.order.push(id);
        inner.head = id;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(id: u64) -> RevisionId {
        RevisionId::new(id)
    }

    fn ids(revs: &[RevisionId]) -> Vec<u64> {
        revs.iter().map(|r| r.value()).collect()
    }

    #[test]
    fn test_new_set_holds_root() {
        let set = RevisionSet::new();
        assert_eq!(set.snapshot(), vec![RevisionId::ROOT]);
        assert_eq!(set.head(), RevisionId::ROOT);
    }

    #[test]
    fn test_merge_appends_and_moves_head() {
        let set = RevisionSet::new();
        assert!(set.merge(rev(20)));
        assert!(set.merge(rev(10)));

        assert_eq!(ids(&set.snapshot()), vec![0, 20, 10]);
        // Head is the last added id, not the largest
        assert_eq!(set.head(), rev(10));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let set = RevisionSet::new();
        set.merge(rev(5));
        set.merge(rev(6));
        assert!(!set.merge(rev(5)));

        assert_eq!(ids(&set.snapshot()), vec![0, 5, 6]);
        assert_eq!(set.head(), rev(6));
    }

    #[test]
    fn test_merging_root_is_noop() {
        let set = RevisionSet::new();
        set.merge(rev(3));
        assert!(!set.merge(RevisionId::ROOT));
        assert_eq!(set.head(), rev(3));
        assert_eq!(set.snapshot()[0], RevisionId::ROOT);
    }

    #[test]
    fn test_merge_all_counts_new_ids() {
        let set = RevisionSet::new();
        set.merge(rev(2));
        let added = set.merge_all(&[rev(1), rev(2), rev(3)]);

        assert_eq!(added, 2);
        assert_eq!(ids(&set.snapshot()), vec![0, 2, 1, 3]);
        assert_eq!(set.head(), rev(3));
    }

    #[test]
    fn test_snapshot_upto() {
        let set = RevisionSet::new();
        set.merge_all(&[rev(7), rev(8), rev(9)]);

        assert_eq!(ids(&set.snapshot_upto(RevisionId::ROOT).unwrap()), vec![0]);
        assert_eq!(ids(&set.snapshot_upto(rev(8)).unwrap()), vec![0, 7, 8]);
        assert_eq!(set.snapshot_upto(set.head()).unwrap(), set.snapshot());
    }

    #[test]
    fn test_snapshot_upto_unknown() {
        let set = RevisionSet::new();
        let result = set.snapshot_upto(rev(404));
        assert!(matches!(result, Err(JournalError::UnknownRevision(id)) if id == rev(404)));
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let set = RevisionSet::new();
        let before = set.snapshot();
        set.merge(rev(1));
        assert_eq!(before, vec![RevisionId::ROOT]);
        assert!(set.contains(rev(1)));
    }
}
