//! State lifecycle status

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a vault state.
///
/// A stored state is either `Unconsumed` or `Consumed`; it moves from the
/// former to the latter exactly once. `All` only exists as a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateStatus {
    Unconsumed,
    Consumed,
    All,
}

impl StateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateStatus::Unconsumed => "UNCONSUMED",
            StateStatus::Consumed => "CONSUMED",
            StateStatus::All => "ALL",
        }
    }

    /// Returns true if a stored state with `actual` status passes this filter.
    pub fn admits(&self, actual: StateStatus) -> bool {
        match self {
            StateStatus::All => true,
            filter => *filter == actual,
        }
    }

    /// Widens two status filters into one that admits both.
    pub fn union(self, other: StateStatus) -> StateStatus {
        if self == other {
            self
        } else {
            StateStatus::All
        }
    }
}

impl Default for StateStatus {
    fn default() -> Self {
        StateStatus::Unconsumed
    }
}

impl fmt::Display for StateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
