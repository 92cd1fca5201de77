//! # Update Feed Errors

use thiserror::Error;

/// Result type for update feed operations
pub type RealtimeResult<T> = Result<T, RealtimeError>;

/// Update feed errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealtimeError {
    /// Subscriber limit reached
    #[error("Too many subscriptions (max: {0})")]
    TooManySubscriptions(usize),

    /// Subscriber registry unusable
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RealtimeError {
    /// Stable code for logs and metrics
    pub fn code(&self) -> &'static str {
        match self {
            RealtimeError::TooManySubscriptions(_) => "VAULT_TOO_MANY_SUBSCRIPTIONS",
            RealtimeError::Internal(_) => "VAULT_SUBSCRIPTION_INTERNAL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RealtimeError::TooManySubscriptions(2).to_string(),
            "Too many subscriptions (max: 2)"
        );
        assert_eq!(
            RealtimeError::Internal("poisoned".into()).code(),
            "VAULT_SUBSCRIPTION_INTERNAL"
        );
    }
}
