//! Contract states and their identities

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::status::StateStatus;
use super::types::RecordType;
use crate::mvcc::CommitId;
use crate::schema::AttributeValue;

/// SHA-256 identity of the transaction that produced a state.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId([u8; 32]);

impl TxId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash of arbitrary transaction content.
    pub fn of(content: &[u8]) -> Self {
        let digest = Sha256::digest(content);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// A fresh identity for a transaction with no stable content.
    pub fn random() -> Self {
        Self::of(&rand::random::<[u8; 32]>())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Unique, immutable reference to a state: producing transaction + output index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    pub txhash: TxId,
    pub index: u32,
}

impl StateRef {
    pub fn new(txhash: TxId, index: u32) -> Self {
        Self { txhash, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.txhash, self.index)
    }
}

/// A named ledger participant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
}

impl Party {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Identity of a linear state's lineage.
///
/// Equality and ordering use `id` only; the external id is a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueIdentifier {
    pub external_id: Option<String>,
    pub id: Uuid,
}

impl UniqueIdentifier {
    pub fn new() -> Self {
        Self {
            external_id: None,
            id: Uuid::new_v4(),
        }
    }

    pub fn with_external_id(external_id: impl Into<String>) -> Self {
        Self {
            external_id: Some(external_id.into()),
            id: Uuid::new_v4(),
        }
    }
}

impl Default for UniqueIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for UniqueIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UniqueIdentifier {}

impl std::hash::Hash for UniqueIdentifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for UniqueIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UniqueIdentifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for UniqueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.external_id {
            Some(ext) => write!(f, "{}_{}", ext, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// An immutable contract state payload.
///
/// `fields` holds the schema-mapped attributes (e.g. `pennies`, `currency`)
/// that custom criteria and aggregates resolve against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractState {
    pub contract_type: RecordType,
    pub participants: Vec<Party>,
    pub linear_id: Option<UniqueIdentifier>,
    pub deal_reference: Option<String>,
    pub fields: BTreeMap<String, AttributeValue>,
}

impl ContractState {
    pub fn new(contract_type: RecordType) -> Self {
        Self {
            contract_type,
            participants: Vec::new(),
            linear_id: None,
            deal_reference: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_participant(mut self, party: Party) -> Self {
        self.participants.push(party);
        self
    }

    pub fn with_linear_id(mut self, linear_id: UniqueIdentifier) -> Self {
        self.linear_id = Some(linear_id);
        self
    }

    pub fn with_deal_reference(mut self, reference: impl Into<String>) -> Self {
        self.deal_reference = Some(reference.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&AttributeValue> {
        self.fields.get(name)
    }

    pub fn is_linear(&self) -> bool {
        self.linear_id.is_some()
    }
}

/// A state paired with the reference that identifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: ContractState,
    pub reference: StateRef,
}

impl StateAndRef {
    pub fn new(state: ContractState, reference: StateRef) -> Self {
        Self { state, reference }
    }
}

/// Vault bookkeeping kept alongside each stored state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMetadata {
    pub reference: StateRef,
    pub contract_type: RecordType,
    pub status: StateStatus,
    pub recorded_time: DateTime<Utc>,
    pub consumed_time: Option<DateTime<Utc>>,
    pub recorded_commit: CommitId,
    pub consumed_commit: Option<CommitId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_id_is_content_hash() {
        assert_eq!(TxId::of(b"tx-1"), TxId::of(b"tx-1"));
        assert_ne!(TxId::of(b"tx-1"), TxId::of(b"tx-2"));
        assert_eq!(TxId::of(b"tx-1").to_hex().len(), 64);
    }

    #[test]
    fn test_random_tx_ids_differ() {
        assert_ne!(TxId::random(), TxId::random());
    }

    #[test]
    fn test_state_ref_ordering() {
        let tx = TxId::of(b"tx");
        assert!(StateRef::new(tx, 0) < StateRef::new(tx, 1));
    }

    #[test]
    fn test_unique_identifier_equality_ignores_label() {
        let a = UniqueIdentifier::with_external_id("deal-1");
        let mut b = a.clone();
        b.external_id = Some("renamed".into());
        assert_eq!(a, b);
        assert_ne!(a, UniqueIdentifier::new());
    }

    #[test]
    fn test_contract_state_builder() {
        let state = ContractState::new(RecordType::new("Cash"))
            .with_participant(Party::new("MegaCorp"))
            .with_field("pennies", 100i64)
            .with_field("currency", "USD");

        assert_eq!(state.field("pennies"), Some(&AttributeValue::Int(100)));
        assert_eq!(state.field("currency"), Some(&AttributeValue::from("USD")));
        assert!(!state.is_linear());
    }
}
