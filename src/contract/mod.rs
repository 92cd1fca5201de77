//! Vault data model
//!
//! States are immutable once recorded; only their status changes, from
//! `Unconsumed` to `Consumed`, exactly once. A `StateRef` identifies a state
//! for its whole life and is never produced twice.

mod state;
mod status;
mod types;

pub use state::{
    ContractState, Party, StateAndRef, StateMetadata, StateRef, TxId, UniqueIdentifier,
};
pub use status::StateStatus;
pub use types::{RecordType, TypeRegistry};
