//! Commit Authority - commit identity assignment
//!
//! - Commit identities are assigned exactly once
//! - Assignment occurs as part of commit
//! - The ordering is total and strict
//!
//! The authority is owned by the store and only touched under its write
//! lock, so it needs no internal synchronization.

use crate::mvcc::{CommitId, ReadView};

/// Commit authority for the vault store.
#[derive(Debug)]
pub struct CommitAuthority {
    /// The highest commit identity assigned so far (0 before the first commit).
    highest_commit_id: u64,
}

impl CommitAuthority {
    /// Create a new commit authority starting from zero.
    pub fn new() -> Self {
        Self {
            highest_commit_id: 0,
        }
    }

    /// Get the next commit identity to assign.
    ///
    /// The identity does not exist until `mark_committed` accepts it.
    pub fn next_commit_id(&self) -> CommitId {
        CommitId::new(self.highest_commit_id + 1)
    }

    /// Mark a commit identity as assigned once the commit has been applied.
    pub fn mark_committed(&mut self, commit_id: CommitId) -> Result<(), CommitAuthorityError> {
        let id_value = commit_id.value();
        if id_value != self.highest_commit_id + 1 {
            return Err(CommitAuthorityError::OutOfOrder {
                attempted: id_value,
                expected: self.highest_commit_id + 1,
            });
        }
        self.highest_commit_id = id_value;
        Ok(())
    }

    /// Get the current highest commit identity.
    pub fn highest_commit_id(&self) -> Option<CommitId> {
        if self.highest_commit_id == 0 {
            None
        } else {
            Some(CommitId::new(self.highest_commit_id))
        }
    }

    /// Create a read view at the current commit point.
    ///
    /// The view covers every commit assigned so far, and nothing after.
    pub fn current_snapshot(&self) -> ReadView {
        ReadView::new(CommitId::new(self.highest_commit_id))
    }
}

impl Default for CommitAuthority {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from commit authority operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitAuthorityError {
    /// Attempted to commit out of order.
    OutOfOrder { attempted: u64, expected: u64 },
}

impl std::fmt::Display for CommitAuthorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitAuthorityError::OutOfOrder { attempted, expected } => {
                write!(
                    f,
                    "Out of order commit: attempted {} but expected {}",
                    attempted, expected
                )
            }
        }
    }
}

impl std::error::Error for CommitAuthorityError {}
