//! Predicate filtering for query execution
//!
//! Comparisons follow SQL null semantics: a null value or a null operand
//! never satisfies a comparison, only `IS NULL` / `IS NOT NULL` look at nulls.
//! Values of incompatible kinds never compare equal or ordered.

use std::cmp::Ordering;

use crate::criteria::FilterOp;
use crate::planner::{CompiledFilter, LinearPredicate, RowPredicate};
use crate::schema::AttributeValue;
use crate::storage::StoredState;

/// Evaluates compiled predicates against stored states
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a stored state satisfies the predicate
    pub fn matches(predicate: &RowPredicate, row: &StoredState) -> bool {
        match predicate {
            RowPredicate::Always => true,
            RowPredicate::Status(status) => status.admits(row.metadata.status),
            RowPredicate::TypeIn(types) => types.contains(&row.metadata.contract_type),
            RowPredicate::Linear(linear) => Self::linear_match(linear, row),
            RowPredicate::Compare { attribute, filter } => {
                // Rows outside the attribute's schema never match
                match attribute.read(&row.state_and_ref, &row.metadata) {
                    Some(value) => Self::value_match(&value, filter),
                    None => false,
                }
            }
            RowPredicate::And(l, r) => Self::matches(l, row) && Self::matches(r, row),
            RowPredicate::Or(l, r) => Self::matches(l, row) || Self::matches(r, row),
        }
    }

    fn linear_match(linear: &LinearPredicate, row: &StoredState) -> bool {
        let state = &row.state_and_ref.state;
        let Some(linear_id) = &state.linear_id else {
            return false;
        };

        let participants_ok = linear.participants.as_ref().map_or(true, |wanted| {
            state.participants.iter().any(|p| wanted.contains(p))
        });
        let ids_ok = linear
            .linear_ids
            .as_ref()
            .map_or(true, |wanted| wanted.contains(linear_id));
        let deals_ok = linear.deal_references.as_ref().map_or(true, |wanted| {
            state
                .deal_reference
                .as_ref()
                .map_or(false, |r| wanted.contains(r))
        });

        participants_ok && ids_ok && deals_ok
    }

    /// Evaluates one filter against a value
    pub fn value_match(value: &AttributeValue, filter: &CompiledFilter) -> bool {
        match &filter.op {
            FilterOp::IsNull => return value.is_null(),
            FilterOp::NotNull => return !value.is_null(),
            _ if value.is_null() => return false,
            _ => {}
        }

        match &filter.op {
            FilterOp::Equal(x) => compare(value, x) == Some(Ordering::Equal),
            FilterOp::NotEqual(x) => matches!(compare(value, x), Some(o) if o != Ordering::Equal),
            FilterOp::GreaterThan(x) => compare(value, x) == Some(Ordering::Greater),
            FilterOp::GreaterThanOrEqual(x) => {
                matches!(compare(value, x), Some(Ordering::Greater | Ordering::Equal))
            }
            FilterOp::LessThan(x) => compare(value, x) == Some(Ordering::Less),
            FilterOp::LessThanOrEqual(x) => {
                matches!(compare(value, x), Some(Ordering::Less | Ordering::Equal))
            }
            FilterOp::Between(from, to) => {
                matches!(compare(value, from), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(compare(value, to), Some(Ordering::Less | Ordering::Equal))
            }
            FilterOp::In(values) => values
                .iter()
                .any(|x| compare(value, x) == Some(Ordering::Equal)),
            FilterOp::NotIn(values) => values
                .iter()
                .all(|x| matches!(compare(value, x), Some(o) if o != Ordering::Equal)),
            FilterOp::Like(_) => Self::pattern_match(value, filter).unwrap_or(false),
            FilterOp::NotLike(_) => Self::pattern_match(value, filter).map_or(false, |m| !m),
            FilterOp::IsNull | FilterOp::NotNull => false,
        }
    }

    fn pattern_match(value: &AttributeValue, filter: &CompiledFilter) -> Option<bool> {
        let text = value.as_str()?;
        let pattern = filter.pattern.as_ref()?;
        Some(pattern.is_match(text))
    }
}

/// Orders two non-null values of compatible kinds
fn compare(a: &AttributeValue, b: &AttributeValue) -> Option<Ordering> {
    let (ka, kb) = (a.kind()?, b.kind()?);
    if ka == kb || (ka.is_numeric() && kb.is_numeric()) {
        Some(a.cmp(b))
    } else {
        None
    }
}
