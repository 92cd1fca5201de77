//! Grouped aggregation
//!
//! Rows are grouped by the union of all group-by keys, groups are ordered by
//! the plan's group order, and each group emits, for every aggregate in
//! declaration order, the aggregate value followed by that aggregate's own
//! group-by values.
//!
//! Null source values are skipped. `count` counts non-null values, `avg`
//! is always a float, and integer sums stay integers unless they overflow.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::criteria::{AggregateFunction, Direction};
use crate::planner::{AggregateSpec, AggregationPlan};
use crate::schema::AttributeValue;
use crate::storage::StoredState;

/// Computes aggregate projections over filtered rows
pub struct Aggregator;

impl Aggregator {
    /// Returns the flattened aggregate output.
    pub fn aggregate(plan: &AggregationPlan, rows: &[&StoredState]) -> Vec<AttributeValue> {
        let mut groups: BTreeMap<Vec<AttributeValue>, Vec<&StoredState>> = BTreeMap::new();

        // Whole-table aggregates produce one block even over no rows
        if plan.group_keys.is_empty() {
            groups.insert(Vec::new(), Vec::new());
        }

        for row in rows {
            let key: Option<Vec<AttributeValue>> = plan
                .group_keys
                .iter()
                .map(|k| k.read(&row.state_and_ref, &row.metadata))
                .collect();
            // Rows outside a group key's schema cannot be placed in a group
            if let Some(key) = key {
                groups.entry(key).or_default().push(*row);
            }
        }

        let mut ordered: Vec<(Vec<AttributeValue>, Vec<&StoredState>)> =
            groups.into_iter().collect();
        ordered.sort_by(|(a, _), (b, _)| compare_keys(a, b, &plan.group_order));

        let mut out = Vec::new();
        for (key, members) in &ordered {
            for spec in &plan.aggregates {
                out.push(Self::reduce(spec, members));
                for index in &spec.group_by {
                    out.push(key.get(*index).cloned().unwrap_or(AttributeValue::Null));
                }
            }
        }
        out
    }

    fn reduce(spec: &AggregateSpec, rows: &[&StoredState]) -> AttributeValue {
        let values: Vec<AttributeValue> = rows
            .iter()
            .filter_map(|row| spec.source.read(&row.state_and_ref, &row.metadata))
            .filter(|v| !v.is_null())
            .collect();

        match spec.function {
            AggregateFunction::Count => AttributeValue::Int(values.len() as i64),
            AggregateFunction::Sum => sum(&values),
            AggregateFunction::Max => values.iter().max().cloned().unwrap_or(AttributeValue::Null),
            AggregateFunction::Min => values.iter().min().cloned().unwrap_or(AttributeValue::Null),
            AggregateFunction::Avg => {
                if values.is_empty() {
                    return AttributeValue::Null;
                }
                let total: f64 = values.iter().filter_map(AttributeValue::as_f64).sum();
                AttributeValue::Float(total / values.len() as f64)
            }
        }
    }
}

fn sum(values: &[AttributeValue]) -> AttributeValue {
    if values.is_empty() {
        return AttributeValue::Null;
    }
    let all_ints = values.iter().all(|v| matches!(v, AttributeValue::Int(_)));
    if all_ints {
        let exact = values
            .iter()
            .filter_map(AttributeValue::as_i64)
            .try_fold(0i64, |acc, v| acc.checked_add(v));
        if let Some(total) = exact {
            return AttributeValue::Int(total);
        }
    }
    AttributeValue::Float(values.iter().filter_map(AttributeValue::as_f64).sum())
}

fn compare_keys(a: &[AttributeValue], b: &[AttributeValue], order: &[(usize, Direction)]) -> Ordering {
    for (index, direction) in order {
        let ordering = a.get(*index).cmp(&b.get(*index));
        let ordering = match direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
