//! Query Planner subsystem
//!
//! Turns a `VaultQuery` into an immutable `QueryPlan` before any store
//! access. All validation (attribute resolution, operand kinds, paging)
//! happens here so that execution cannot fail on a malformed query.
//!
//! # Design Principles
//!
//! - Deterministic: same query and registry give the same plan
//! - Fail fast: errors surface before the store is read
//! - Pushdown: status and concrete type bounds are handed to the scan
//! - Aggregate leaves never constrain rows

mod errors;
mod explain;
mod planner;
mod predicate;
mod query;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
pub use planner::{AggregateSpec, AggregationPlan, QueryPlan, QueryPlanner, SortKey};
pub use predicate::{CompiledFilter, LinearPredicate, RowPredicate};
pub use query::VaultQuery;

