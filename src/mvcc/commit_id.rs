//! CommitId - Totally ordered commit identity
//!
//! - Totally orders all vault commits
//! - Independent of wall-clock time
//! - No two commits share the same identity

use std::fmt;

use serde::{Deserialize, Serialize};

/// A totally ordered, opaque commit identity.
///
/// Every recorded transaction gets exactly one. Updates published for a
/// commit carry its identity, so a consumer can place any update relative to
/// a snapshot's `ReadView`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(u64);

impl CommitId {
    /// Creates a new CommitId with the given value.
    ///
    /// No Default implementation exists to prevent accidental construction.
    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_id_requires_explicit_construction() {
        let id = CommitId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_commit_id_ordering() {
        assert!(CommitId::new(10) < CommitId::new(20));
        assert_eq!(CommitId::new(100), CommitId::new(100));
    }

    #[test]
    fn test_commit_id_serializes_as_number() {
        let json = serde_json::to_string(&CommitId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_commit_id_display() {
        assert_eq!(CommitId::new(123).to_string(), "#123");
    }
}
