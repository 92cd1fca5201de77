//! Stored state records
//!
//! A `StoredState` is one row of the vault: the immutable state, its vault
//! metadata and the storage sequence that fixes its position in scans.
//! Only the consumption fields of the metadata ever change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::{ContractState, StateAndRef, StateMetadata, StateRef, StateStatus};
use crate::mvcc::CommitId;

/// A state as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    pub state_and_ref: StateAndRef,
    pub metadata: StateMetadata,
    /// Position in storage order, unique per store
    pub sequence: u64,
}

impl StoredState {
    /// A freshly produced, unconsumed state.
    pub fn recorded(
        state_and_ref: StateAndRef,
        commit: CommitId,
        at: DateTime<Utc>,
        sequence: u64,
    ) -> Self {
        let metadata = StateMetadata {
            reference: state_and_ref.reference,
            contract_type: state_and_ref.state.contract_type.clone(),
            status: StateStatus::Unconsumed,
            recorded_time: at,
            consumed_time: None,
            recorded_commit: commit,
            consumed_commit: None,
        };
        Self {
            state_and_ref,
            metadata,
            sequence,
        }
    }

    /// Marks the state consumed by `commit`.
    ///
    /// Returns `false` if it was already consumed; nothing changes then.
    pub fn consume(&mut self, commit: CommitId, at: DateTime<Utc>) -> bool {
        if self.is_consumed() {
            return false;
        }
        self.metadata.status = StateStatus::Consumed;
        self.metadata.consumed_time = Some(at);
        self.metadata.consumed_commit = Some(commit);
        true
    }

    pub fn reference(&self) -> &StateRef {
        &self.state_and_ref.reference
    }

    pub fn state(&self) -> &ContractState {
        &self.state_and_ref.state
    }

    pub fn status(&self) -> StateStatus {
        self.metadata.status
    }

    pub fn is_consumed(&self) -> bool {
        self.metadata.status == StateStatus::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{RecordType, TxId};

    fn row() -> StoredState {
        let state = ContractState::new(RecordType::new("Cash")).with_field("pennies", 100i64);
        StoredState::recorded(
            StateAndRef::new(state, StateRef::new(TxId::of(b"issue"), 0)),
            CommitId::new(1),
            Utc::now(),
            0,
        )
    }

    #[test]
    fn test_recorded_state_is_unconsumed() {
        let row = row();
        assert_eq!(row.status(), StateStatus::Unconsumed);
        assert_eq!(row.metadata.contract_type, RecordType::new("Cash"));
        assert_eq!(row.metadata.reference, *row.reference());
        assert!(row.metadata.consumed_time.is_none());
    }

    #[test]
    fn test_consume_once() {
        let mut row = row();
        let at = Utc::now();
        assert!(row.consume(CommitId::new(2), at));
        assert!(row.is_consumed());
        assert_eq!(row.metadata.consumed_commit, Some(CommitId::new(2)));

        assert!(!row.consume(CommitId::new(3), Utc::now()));
        assert_eq!(row.metadata.consumed_commit, Some(CommitId::new(2)));
        assert_eq!(row.metadata.consumed_time, Some(at));
    }
}
