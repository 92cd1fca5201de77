//! Vault query errors
//!
//! Four kinds, each reported synchronously to the caller:
//!
//! - `Validation`: malformed or unresolvable criteria, before store access
//! - `Paging`: page outside bounds, before store access
//! - `StoreAccess`: the store could not be read; never retried here
//! - `Subscription`: the live feed could not be registered; `track_by`
//!   then returns nothing at all

use thiserror::Error;

use crate::executor::ExecutorError;
use crate::planner::{PlannerError, PlannerErrorCode};
use crate::realtime::RealtimeError;
use crate::storage::StorageError;

/// Result type for vault queries
pub type VaultQueryResult<T> = Result<T, VaultQueryError>;

/// Errors returned by `query_by` and `track_by`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultQueryError {
    #[error("Query validation failed: {0}")]
    Validation(PlannerError),

    #[error("Paging rejected: {0}")]
    Paging(PlannerError),

    #[error("Store access failed: {0}")]
    StoreAccess(StorageError),

    #[error("Subscription failed: {0}")]
    Subscription(#[from] RealtimeError),
}

impl VaultQueryError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            VaultQueryError::Validation(e) | VaultQueryError::Paging(e) => e.code().code(),
            VaultQueryError::StoreAccess(e) => e.code().code(),
            VaultQueryError::Subscription(e) => e.code(),
        }
    }

    /// True for errors raised before the store was touched.
    pub fn is_rejected_before_store(&self) -> bool {
        matches!(
            self,
            VaultQueryError::Validation(_) | VaultQueryError::Paging(_)
        )
    }
}

impl From<PlannerError> for VaultQueryError {
    fn from(err: PlannerError) -> Self {
        match err.code() {
            PlannerErrorCode::VaultPagingInvalid => VaultQueryError::Paging(err),
            _ => VaultQueryError::Validation(err),
        }
    }
}

impl From<StorageError> for VaultQueryError {
    fn from(err: StorageError) -> Self {
        VaultQueryError::StoreAccess(err)
    }
}

impl From<ExecutorError> for VaultQueryError {
    fn from(err: ExecutorError) -> Self {
        VaultQueryError::StoreAccess(StorageError::unavailable(err.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planner_errors_route_by_code() {
        let paging: VaultQueryError = PlannerError::paging_invalid("too big").into();
        assert!(matches!(paging, VaultQueryError::Paging(_)));
        assert_eq!(paging.code(), "VAULT_PAGING_INVALID");

        let invalid: VaultQueryError = PlannerError::query_invalid("no types").into();
        assert!(matches!(invalid, VaultQueryError::Validation(_)));
        assert!(invalid.is_rejected_before_store());
    }

    #[test]
    fn test_store_errors_map_to_store_access() {
        let err: VaultQueryError = ExecutorError::store_unavailable("disk gone").into();
        assert_eq!(err.code(), "VAULT_STORE_UNAVAILABLE");
        assert!(!err.is_rejected_before_store());

        let err: VaultQueryError = RealtimeError::TooManySubscriptions(1).into();
        assert!(err.to_string().starts_with("Subscription failed"));
    }
}
