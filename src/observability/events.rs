//! Observable vault events
//!
//! Events are explicit and typed; each carries its own severity.

use std::fmt;

use super::logger::Severity;

/// Observable events of the vault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded
    ConfigLoaded,

    // Query operations
    /// Query executed successfully
    QueryExecuted,
    /// Query rejected (validation, paging or store access)
    QueryRejected,
    /// Plan rendering for a query
    QueryExplain,
    /// trackBy returned a snapshot and a live feed
    TrackStarted,

    // Store mutations
    /// Transaction recorded
    Commit,
    /// Transaction refused, nothing applied
    CommitRejected,

    // Update feed
    /// Update handed to subscribers
    UpdatePublished,
    /// Subscriber registered
    SubscriptionOpened,
    /// Subscriber released
    SubscriptionClosed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "VAULT_CONFIG_LOADED",
            Event::QueryExecuted => "VAULT_QUERY_EXECUTED",
            Event::QueryRejected => "VAULT_QUERY_REJECTED",
            Event::QueryExplain => "VAULT_QUERY_EXPLAIN",
            Event::TrackStarted => "VAULT_TRACK_STARTED",
            Event::Commit => "VAULT_COMMIT",
            Event::CommitRejected => "VAULT_COMMIT_REJECTED",
            Event::UpdatePublished => "VAULT_UPDATE_PUBLISHED",
            Event::SubscriptionOpened => "VAULT_SUBSCRIPTION_OPENED",
            Event::SubscriptionClosed => "VAULT_SUBSCRIPTION_CLOSED",
        }
    }

    /// Returns the severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryExplain | Event::UpdatePublished => Severity::Trace,
            Event::QueryRejected | Event::CommitRejected => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
