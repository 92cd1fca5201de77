//! Result sorting for query execution
//!
//! Multi-key, stable sort. Rows enter in storage order, which therefore
//! breaks ties. Values a row cannot provide sort as null, and nulls sort
//! first ascending.

use std::cmp::Ordering;

use crate::criteria::Direction;
use crate::planner::SortKey;
use crate::schema::AttributeValue;
use crate::storage::StoredState;

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows by the keys, in key order.
    pub fn sort(rows: &mut [&StoredState], keys: &[SortKey]) {
        if keys.is_empty() {
            return;
        }
        rows.sort_by(|a, b| Self::compare_rows(a, b, keys));
    }

    fn compare_rows(a: &StoredState, b: &StoredState, keys: &[SortKey]) -> Ordering {
        for key in keys {
            let a_val = Self::sort_value(a, key);
            let b_val = Self::sort_value(b, key);
            let ordering = match key.direction {
                Direction::Asc => a_val.cmp(&b_val),
                Direction::Desc => b_val.cmp(&a_val),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn sort_value(row: &StoredState, key: &SortKey) -> AttributeValue {
        key.attribute
            .read(&row.state_and_ref, &row.metadata)
            .unwrap_or(AttributeValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractState, RecordType, StateAndRef, StateRef, TxId};
    use crate::mvcc::CommitId;
    use crate::schema::{ResolvedAttribute, StandardAttribute};
    use chrono::Utc;

    fn row(deal: Option<&str>, sequence: u64) -> StoredState {
        let mut state = ContractState::new(RecordType::new("DummyDeal"));
        if let Some(d) = deal {
            state = state.with_deal_reference(d);
        }
        StoredState::recorded(
            StateAndRef::new(state, StateRef::new(TxId::of(&sequence.to_le_bytes()), 0)),
            CommitId::new(sequence + 1),
            Utc::now(),
            sequence,
        )
    }

    fn deal_key(direction: Direction) -> SortKey {
        SortKey {
            attribute: ResolvedAttribute::Standard(StandardAttribute::DealReference),
            direction,
        }
    }

    fn deals(rows: &[&StoredState]) -> Vec<Option<String>> {
        rows.iter()
            .map(|r| r.state_and_ref.state.deal_reference.clone())
            .collect()
    }

    #[test]
    fn test_sort_ascending_nulls_first() {
        let (a, b, c) = (row(Some("456"), 0), row(None, 1), row(Some("123"), 2));
        let mut rows = vec![&a, &b, &c];
        ResultSorter::sort(&mut rows, &[deal_key(Direction::Asc)]);
        assert_eq!(
            deals(&rows),
            vec![None, Some("123".into()), Some("456".into())]
        );
    }

    #[test]
    fn test_sort_descending() {
        let (a, b, c) = (row(Some("456"), 0), row(None, 1), row(Some("123"), 2));
        let mut rows = vec![&a, &b, &c];
        ResultSorter::sort(&mut rows, &[deal_key(Direction::Desc)]);
        assert_eq!(
            deals(&rows),
            vec![Some("456".into()), Some("123".into()), None]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let (a, b, c) = (row(Some("1"), 0), row(Some("1"), 1), row(Some("0"), 2));
        let mut rows = vec![&a, &b, &c];
        ResultSorter::sort(&mut rows, &[deal_key(Direction::Asc)]);
        let sequences: Vec<u64> = rows.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![2, 0, 1]);
    }
}
