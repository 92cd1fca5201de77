//! Result types for query execution

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::contract::{RecordType, StateAndRef, StateMetadata};
use crate::schema::AttributeValue;

/// One page of query results.
///
/// Row queries fill `states` and `states_metadata` (same order). Aggregate
/// queries leave them empty and return flattened scalars in `other_results`:
/// per group, each aggregate's value followed by its own group-by values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// States on this page, in result order
    pub states: Vec<StateAndRef>,
    /// Metadata of `states`, index for index
    pub states_metadata: Vec<StateMetadata>,
    /// Rows matching the criteria before paging
    pub total_states_available: u64,
    /// Concrete types present in `states`
    pub state_types: BTreeSet<RecordType>,
    /// Aggregate values and group keys
    pub other_results: Vec<AttributeValue>,
}

impl Page {
    /// Creates an empty page
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the page of an aggregate query
    pub fn aggregated(total_states_available: u64, other_results: Vec<AttributeValue>) -> Self {
        Self {
            total_states_available,
            other_results,
            ..Self::default()
        }
    }

    /// Returns true if no states are on this page
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the number of states on this page
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns an iterator over the states
    pub fn iter(&self) -> impl Iterator<Item = &StateAndRef> {
        self.states.iter()
    }
}
