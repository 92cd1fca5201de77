//! # Vault Updates
//!
//! One `Update` per commit, carrying everything that commit consumed and
//! produced.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::{RecordType, StateAndRef};
use crate::mvcc::CommitId;

/// The change set of one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Commit that produced this update; strictly increasing per store
    pub commit_id: CommitId,
    pub consumed: Vec<StateAndRef>,
    pub produced: Vec<StateAndRef>,
    pub committed_at: DateTime<Utc>,
}

impl Update {
    pub fn new(
        commit_id: CommitId,
        consumed: Vec<StateAndRef>,
        produced: Vec<StateAndRef>,
        committed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            commit_id,
            consumed,
            produced,
            committed_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty() && self.produced.is_empty()
    }

    /// Copy of this update keeping only states of the given concrete types.
    pub fn restrict_to(&self, types: &BTreeSet<RecordType>) -> Update {
        let keep = |states: &[StateAndRef]| -> Vec<StateAndRef> {
            states
                .iter()
                .filter(|s| types.contains(&s.state.contract_type))
                .cloned()
                .collect()
        };
        Update {
            commit_id: self.commit_id,
            consumed: keep(&self.consumed),
            produced: keep(&self.produced),
            committed_at: self.committed_at,
        }
    }
}
