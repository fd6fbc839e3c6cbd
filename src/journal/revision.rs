//! RevisionId - Opaque revision identity
//!
//! Revision ids are time-derived and supplied by the writer. They are
//! comparable for equality and usable as scan keys, but their numeric
//! order is NOT the commit order: concurrent writers may finalize their
//! commits out of numeric order. Journal order comes from commit-flag
//! timestamps only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque 64-bit revision identity.
///
/// `RevisionId::ROOT` (0) denotes the empty initial state. It is present in
/// every journal and always first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(u64);

impl RevisionId {
    /// The sentinel revision of the empty initial state.
    pub const ROOT: RevisionId = RevisionId(0);

    /// Creates a new RevisionId with the given value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Whether this is the root sentinel.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for RevisionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_zero() {
        assert_eq!(RevisionId::ROOT.value(), 0);
        assert!(RevisionId::ROOT.is_root());
        assert!(!RevisionId::new(42).is_root());
    }

    #[test]
    fn test_revision_id_equality() {
        assert_eq!(RevisionId::new(100), RevisionId::from(100));
        assert_ne!(RevisionId::new(100), RevisionId::new(200));
    }

    #[test]
    fn test_revision_id_display() {
        assert_eq!(RevisionId::new(123).to_string(), "123");
    }

    #[test]
    fn test_revision_id_serializes_as_number() {
        let json = serde_json::to_string(&RevisionId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: RevisionId = serde_json::from_str("7").unwrap();
        assert_eq!(back, RevisionId::new(7));
    }
}
