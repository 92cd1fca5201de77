//! vaultdb - state query and change notification for a ledger vault
//!
//! Queries are composed from a criteria algebra, planned and validated
//! before any store access, then evaluated against a consistent view of
//! the store. `track_by` pairs that view with a feed of later commits.

pub mod config;
pub mod contract;
pub mod criteria;
pub mod executor;
pub mod mvcc;
pub mod observability;
pub mod planner;
pub mod realtime;
pub mod schema;
pub mod storage;
pub mod vault;

pub use config::{ConfigError, VaultConfig};
pub use criteria::{and, or, PageSpecification, QueryCriteria, Sort, SortColumn};
pub use executor::Page;
pub use vault::{PageAndUpdates, VaultQuery, VaultQueryError, VaultQueryService};
