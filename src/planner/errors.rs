//! Planner error types
//!
//! Error codes:
//! - VAULT_QUERY_INVALID (REJECT)
//! - VAULT_UNKNOWN_ATTRIBUTE (REJECT)
//! - VAULT_ATTRIBUTE_TYPE_MISMATCH (REJECT)
//! - VAULT_PAGING_INVALID (REJECT)
//!
//! Every planner error is raised before the store is touched.

use std::fmt;

use crate::schema::Attribute;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Malformed criteria or sort
    VaultQueryInvalid,
    /// Attribute cannot be resolved for the queried types
    VaultUnknownAttribute,
    /// Operand or aggregate incompatible with the field kind
    VaultAttributeTypeMismatch,
    /// Page number or page size out of range
    VaultPagingInvalid,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::VaultQueryInvalid => "VAULT_QUERY_INVALID",
            PlannerErrorCode::VaultUnknownAttribute => "VAULT_UNKNOWN_ATTRIBUTE",
            PlannerErrorCode::VaultAttributeTypeMismatch => "VAULT_ATTRIBUTE_TYPE_MISMATCH",
            PlannerErrorCode::VaultPagingInvalid => "VAULT_PAGING_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Attribute name if applicable
    attribute: Option<String>,
}

impl PlannerError {
    /// Create a query invalid error
    pub fn query_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::VaultQueryInvalid,
            message: reason.into(),
            attribute: None,
        }
    }

    /// Create an unknown attribute error
    pub fn unknown_attribute(attribute: &Attribute, reason: &str) -> Self {
        Self {
            code: PlannerErrorCode::VaultUnknownAttribute,
            message: format!("Attribute '{}' cannot be resolved: {}", attribute, reason),
            attribute: Some(attribute.to_string()),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(attribute: &Attribute, reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::VaultAttributeTypeMismatch,
            message: format!("Attribute '{}': {}", attribute, reason.into()),
            attribute: Some(attribute.to_string()),
        }
    }

    /// Create a paging error
    pub fn paging_invalid(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::VaultPagingInvalid,
            message: reason.into(),
            attribute: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns true for page specification errors
    pub fn is_paging(&self) -> bool {
        self.code == PlannerErrorCode::VaultPagingInvalid
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attribute name if applicable
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
