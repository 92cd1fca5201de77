//! Query executor
//!
//! Executes query plans against a state source.
//!
//! Execution flow (strict order):
//! 1. Scan the source for the plan's concrete types and status
//! 2. Filter rows with the compiled predicate
//! 3. Aggregation plans: group, reduce and return (no states, no paging)
//! 4. Otherwise sort (stable, storage order breaks ties)
//! 5. Count the filtered rows, then slice the requested page

use std::collections::BTreeSet;

use crate::contract::{RecordType, StateStatus};
use crate::planner::QueryPlan;
use crate::storage::StoredState;

use super::aggregate::Aggregator;
use super::errors::ExecutorResult;
use super::filters::PredicateFilter;
use super::result::Page;
use super::sorter::ResultSorter;

/// Read access to stored states.
///
/// Implementations must return a consistent view for the duration of the
/// borrow, in ascending storage (sequence) order.
pub trait StateSource {
    /// Returns the states of the given concrete types whose status is
    /// admitted by `status`.
    fn scan(
        &self,
        types: &BTreeSet<RecordType>,
        status: StateStatus,
    ) -> ExecutorResult<Vec<&StoredState>>;
}

/// Query executor that processes plans against a state source
pub struct QueryExecutor<'a, S: StateSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: StateSource + ?Sized> QueryExecutor<'a, S> {
    /// Creates a new executor
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Executes a query plan and returns one page.
    ///
    /// Deterministic: same plan + same data = same page.
    pub fn execute(&self, plan: &QueryPlan) -> ExecutorResult<Page> {
        if plan.scan_types.is_empty() && plan.aggregation.is_none() {
            return Ok(Page::empty());
        }

        // Steps 1-2
        let mut rows = self.source.scan(&plan.scan_types, plan.scan_status)?;
        rows.retain(|row| PredicateFilter::matches(&plan.predicate, row));
        let total = rows.len() as u64;

        // Step 3
        if let Some(aggregation) = &plan.aggregation {
            return Ok(Page::aggregated(
                total,
                Aggregator::aggregate(aggregation, &rows),
            ));
        }

        // Step 4
        rows.sort_by_key(|row| row.sequence);
        ResultSorter::sort(&mut rows, &plan.sort);

        // Step 5
        let page_size = plan.paging.page_size.max(0) as usize;
        let mut page = Page {
            total_states_available: total,
            ..Page::empty()
        };
        for row in rows.into_iter().skip(plan.paging.offset()).take(page_size) {
            page.state_types
                .insert(row.metadata.contract_type.clone());
            page.states.push(row.state_and_ref.clone());
            page.states_metadata.push(row.metadata.clone());
        }
        Ok(page)
    }
}
