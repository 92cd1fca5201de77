//! Vault query service
//!
//! The public entry point: `query_by` for one-off queries and `track_by`
//! for a consistent snapshot plus a live feed of later commits.

mod errors;
mod service;

pub use errors::{VaultQueryError, VaultQueryResult};
pub use service::{PageAndUpdates, VaultQueryService};

pub use crate::planner::VaultQuery;
