//! Vault transactions
//!
//! The unit the mutation pipeline hands to the store: the references it
//! spends and the states it creates. A transaction is applied whole or not
//! at all.

use crate::contract::{ContractState, StateAndRef, StateRef, TxId};

/// One logical commit against the vault.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultTransaction {
    pub id: TxId,
    pub consumed: Vec<StateRef>,
    pub produced: Vec<StateAndRef>,
}

impl VaultTransaction {
    /// A transaction with a fresh identity.
    pub fn new() -> Self {
        Self::with_id(TxId::random())
    }

    pub fn with_id(id: TxId) -> Self {
        Self {
            id,
            consumed: Vec::new(),
            produced: Vec::new(),
        }
    }

    pub fn consuming(mut self, reference: StateRef) -> Self {
        self.consumed.push(reference);
        self
    }

    /// Adds an output; its reference is this transaction's id and the next
    /// output index.
    pub fn producing(mut self, state: ContractState) -> Self {
        let index = self.produced.len() as u32;
        self.produced
            .push(StateAndRef::new(state, StateRef::new(self.id, index)));
        self
    }

    /// Reference of the `index`-th output.
    pub fn output_ref(&self, index: u32) -> StateRef {
        StateRef::new(self.id, index)
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty() && self.produced.is_empty()
    }
}

impl Default for VaultTransaction {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::RecordType;

    #[test]
    fn test_outputs_are_indexed_in_order() {
        let tx = VaultTransaction::with_id(TxId::of(b"issue"))
            .producing(ContractState::new(RecordType::new("Cash")))
            .producing(ContractState::new(RecordType::new("Cash")));

        assert_eq!(tx.produced[0].reference, tx.output_ref(0));
        assert_eq!(tx.produced[1].reference.index, 1);
        assert!(!tx.is_empty());
    }

    #[test]
    fn test_fresh_transactions_have_distinct_ids() {
        assert_ne!(VaultTransaction::new().id, VaultTransaction::new().id);
        assert!(VaultTransaction::new().is_empty());
    }
}
