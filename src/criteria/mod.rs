//! Query criteria algebra
//!
//! Criteria form an immutable tree of leaves combined with binary AND/OR:
//!
//! - `Vault`: status filter plus optional contract type restriction
//! - `Linear`: participant / linear id / deal reference restriction
//! - `Custom`: attribute filters and aggregate projections
//!
//! Attribute names are not checked here. Resolution happens when a query is
//! planned against the registered schemas.

mod ast;
mod builder;
mod expression;
mod paging;

pub use ast::{
    and, or, CriteriaNode, CustomCriteria, LinearCriteria, QueryCriteria, VaultCriteria,
};
pub use expression::{AggregateFunction, CriteriaExpression, FilterOp};
pub use paging::{Direction, PageSpecification, Sort, SortColumn, DEFAULT_PAGE_NUM, MAX_PAGE_SIZE};
