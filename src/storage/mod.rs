//! Vault record store
//!
//! The store the query engine reads from and the mutation pipeline writes
//! to. It is in-memory; persistence is out of scope.
//!
//! # Design Principles
//!
//! - Transactions apply whole or not at all
//! - A state is recorded once and consumed at most once
//! - Every commit publishes exactly one update, before `record` returns
//! - Readers see whole commits only

mod errors;
mod record;
mod store;
mod transaction;

pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use record::StoredState;
pub use store::{VaultSnapshot, VaultStore};
pub use transaction::VaultTransaction;
