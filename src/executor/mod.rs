//! Query Executor subsystem
//!
//! Consumes plans and produces deterministic result pages.
//!
//! # Execution Flow (strict order)
//!
//! 1. Scan the state source (status and type pushdown)
//! 2. Filter rows with the compiled predicate
//! 3. Aggregate, or sort and page

mod aggregate;
mod errors;
mod executor;
mod filters;
mod result;
mod sorter;

pub use aggregate::Aggregator;
pub use errors::{ExecutorError, ExecutorErrorCode, ExecutorResult, Severity};
pub use executor::{QueryExecutor, StateSource};
pub use filters::PredicateFilter;
pub use result::Page;
pub use sorter::ResultSorter;
