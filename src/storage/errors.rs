//! Vault store error types
//!
//! Error codes:
//! - VAULT_STORE_UNAVAILABLE (ERROR severity)
//! - VAULT_UNKNOWN_STATE (REJECT severity)
//! - VAULT_DOUBLE_SPEND (REJECT severity)
//! - VAULT_DUPLICATE_STATE (REJECT severity)
//! - VAULT_UNKNOWN_TYPE (REJECT severity)
//!
//! Rejected transactions leave the store untouched.

use std::fmt;

use crate::contract::{RecordType, StateRef};

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Transaction refused, store unchanged
    Reject,
    /// Store cannot serve the request
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Store error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Store closed or its lock poisoned
    VaultStoreUnavailable,
    /// Consumed reference was never recorded
    VaultUnknownState,
    /// Consumed reference is already consumed
    VaultDoubleSpend,
    /// Produced reference already exists
    VaultDuplicateState,
    /// Produced state has no registered concrete type
    VaultUnknownType,
}

impl StorageErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::VaultStoreUnavailable => "VAULT_STORE_UNAVAILABLE",
            StorageErrorCode::VaultUnknownState => "VAULT_UNKNOWN_STATE",
            StorageErrorCode::VaultDoubleSpend => "VAULT_DOUBLE_SPEND",
            StorageErrorCode::VaultDuplicateState => "VAULT_DUPLICATE_STATE",
            StorageErrorCode::VaultUnknownType => "VAULT_UNKNOWN_TYPE",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::VaultStoreUnavailable => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    /// Offending state reference, if any
    reference: Option<StateRef>,
}

impl StorageError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::VaultStoreUnavailable,
            message: reason.into(),
            reference: None,
        }
    }

    pub fn unknown_state(reference: StateRef) -> Self {
        Self {
            code: StorageErrorCode::VaultUnknownState,
            message: "consumed state was never recorded".to_string(),
            reference: Some(reference),
        }
    }

    pub fn double_spend(reference: StateRef) -> Self {
        Self {
            code: StorageErrorCode::VaultDoubleSpend,
            message: "state is already consumed".to_string(),
            reference: Some(reference),
        }
    }

    pub fn duplicate_state(reference: StateRef) -> Self {
        Self {
            code: StorageErrorCode::VaultDuplicateState,
            message: "state reference already recorded".to_string(),
            reference: Some(reference),
        }
    }

    pub fn unknown_type(record_type: &RecordType, reference: StateRef) -> Self {
        Self {
            code: StorageErrorCode::VaultUnknownType,
            message: format!("{} is not a registered concrete type", record_type),
            reference: Some(reference),
        }
    }

    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reference(&self) -> Option<&StateRef> {
        self.reference.as_ref()
    }

    /// Whether the store itself is unusable, as opposed to one bad transaction.
    pub fn is_unavailable(&self) -> bool {
        self.code == StorageErrorCode::VaultStoreUnavailable
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(reference) = &self.reference {
            write!(f, " (state: {})", reference)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {}

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;
