//! ReadView - Stable snapshot boundary
//!
//! A read view names the last commit a snapshot reflects. It is established
//! when the read starts and never changes afterwards.

use serde::{Deserialize, Serialize};

use super::CommitId;

/// A stable snapshot boundary for read operations.
///
/// Commits with an identity above `read_upper_bound` are not reflected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ReadView {
    /// The maximum commit identity visible to this read.
    read_upper_bound: CommitId,
}

impl ReadView {
    /// Creates a new read view with the given upper bound.
    #[inline]
    pub fn new(upper_bound: CommitId) -> Self {
        Self {
            read_upper_bound: upper_bound,
        }
    }

    /// Returns the upper bound commit identity.
    #[inline]
    pub fn upper_bound(&self) -> CommitId {
        self.read_upper_bound
    }

    /// Returns true if the commit is reflected by this view.
    #[inline]
    pub fn sees(&self, commit_id: CommitId) -> bool {
        commit_id <= self.read_upper_bound
    }
}
