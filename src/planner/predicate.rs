//! Compiled row predicates
//!
//! The criteria tree compiles into a `RowPredicate` whose leaves are bound to
//! resolved attributes. Evaluation lives in the executor.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;

use super::errors::{PlannerError, PlannerResult};
use crate::contract::{Party, RecordType, StateStatus, UniqueIdentifier};
use crate::criteria::{FilterOp, LinearCriteria};
use crate::schema::ResolvedAttribute;

/// A filter operation ready for evaluation.
///
/// LIKE patterns are translated to anchored regular expressions at plan time.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pub op: FilterOp,
    pub pattern: Option<Regex>,
}

impl CompiledFilter {
    pub fn compile(op: FilterOp) -> PlannerResult<Self> {
        let pattern = match &op {
            FilterOp::Like(p) | FilterOp::NotLike(p) => Some(like_to_regex(p)?),
            _ => None,
        };
        Ok(Self { op, pattern })
    }
}

fn like_to_regex(pattern: &str) -> PlannerResult<Regex> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str("(?s)^");
    let mut literal = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut literal))),
        }
    }
    source.push('$');
    Regex::new(&source)
        .map_err(|e| PlannerError::query_invalid(format!("bad LIKE pattern {:?}: {}", pattern, e)))
}

/// Linear identity constraint; `None` fields are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearPredicate {
    pub participants: Option<BTreeSet<Party>>,
    pub linear_ids: Option<BTreeSet<UniqueIdentifier>>,
    pub deal_references: Option<BTreeSet<String>>,
}

impl LinearPredicate {
    pub fn from_criteria(criteria: &LinearCriteria) -> Self {
        fn non_empty<T: Ord + Clone>(values: &Option<Vec<T>>) -> Option<BTreeSet<T>> {
            values
                .as_ref()
                .filter(|v| !v.is_empty())
                .map(|v| v.iter().cloned().collect())
        }
        Self {
            participants: non_empty(&criteria.participants),
            linear_ids: non_empty(&criteria.linear_ids),
            deal_references: non_empty(&criteria.deal_references),
        }
    }
}

/// Executable row predicate.
#[derive(Debug, Clone)]
pub enum RowPredicate {
    Always,
    Status(StateStatus),
    /// Concrete type membership
    TypeIn(BTreeSet<RecordType>),
    Linear(LinearPredicate),
    Compare {
        attribute: ResolvedAttribute,
        filter: CompiledFilter,
    },
    And(Box<RowPredicate>, Box<RowPredicate>),
    Or(Box<RowPredicate>, Box<RowPredicate>),
}

impl RowPredicate {
    pub fn and(left: RowPredicate, right: RowPredicate) -> RowPredicate {
        RowPredicate::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: RowPredicate, right: RowPredicate) -> RowPredicate {
        RowPredicate::Or(Box::new(left), Box::new(right))
    }

    /// Conjunction of all predicates, `None` if there are none.
    pub fn all(predicates: impl IntoIterator<Item = RowPredicate>) -> Option<RowPredicate> {
        predicates.into_iter().reduce(RowPredicate::and)
    }
}

impl fmt::Display for RowPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowPredicate::Always => f.write_str("true"),
            RowPredicate::Status(s) => write!(f, "status {}", s),
            RowPredicate::TypeIn(types) => {
                let names: Vec<&str> = types.iter().map(RecordType::as_str).collect();
                write!(f, "type in [{}]", names.join(", "))
            }
            RowPredicate::Linear(l) => {
                f.write_str("linear")?;
                if let Some(p) = &l.participants {
                    let names: Vec<&str> = p.iter().map(|p| p.name.as_str()).collect();
                    write!(f, " participants [{}]", names.join(", "))?;
                }
                if let Some(ids) = &l.linear_ids {
                    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
                    write!(f, " ids [{}]", ids.join(", "))?;
                }
                if let Some(refs) = &l.deal_references {
                    let refs: Vec<&str> = refs.iter().map(String::as_str).collect();
                    write!(f, " deal refs [{}]", refs.join(", "))?;
                }
                Ok(())
            }
            RowPredicate::Compare { attribute, filter } => {
                write!(f, "{} {}", attribute.attribute(), filter.op)
            }
            RowPredicate::And(l, r) => write!(f, "({} AND {})", l, r),
            RowPredicate::Or(l, r) => write!(f, "({} OR {})", l, r),
        }
    }
}
