//! Query criteria tree
//!
//! Criteria are persistent: combining two criteria never mutates them, and
//! sub-trees are shared by reference count so the same criteria can be reused
//! across queries.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::expression::CriteriaExpression;
use crate::contract::{Party, RecordType, StateStatus, UniqueIdentifier};
use crate::planner::{PlannerError, PlannerResult};

/// Status and type restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultCriteria {
    pub status: StateStatus,
    /// `None` leaves the type unconstrained
    pub contract_types: Option<BTreeSet<RecordType>>,
}

impl VaultCriteria {
    pub fn new(status: StateStatus) -> Self {
        Self {
            status,
            contract_types: None,
        }
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = RecordType>) -> Self {
        self.contract_types = Some(types.into_iter().collect());
        self
    }
}

impl Default for VaultCriteria {
    fn default() -> Self {
        Self::new(StateStatus::Unconsumed)
    }
}

/// Linear state identity restriction.
///
/// Values within one field are alternatives; fields that are present are all
/// required. An absent or empty field places no constraint on that field.
/// Only linear states ever match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearCriteria {
    pub participants: Option<Vec<Party>>,
    pub linear_ids: Option<Vec<UniqueIdentifier>>,
    pub deal_references: Option<Vec<String>>,
}

impl LinearCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participants(mut self, participants: impl IntoIterator<Item = Party>) -> Self {
        self.participants = Some(participants.into_iter().collect());
        self
    }

    pub fn with_linear_ids(mut self, ids: impl IntoIterator<Item = UniqueIdentifier>) -> Self {
        self.linear_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_deal_references<S: Into<String>>(
        mut self,
        references: impl IntoIterator<Item = S>,
    ) -> Self {
        self.deal_references = Some(references.into_iter().map(Into::into).collect());
        self
    }
}

/// Attribute-level expressions, all of which apply.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomCriteria {
    expressions: Vec<CriteriaExpression>,
}

impl CustomCriteria {
    pub fn new(expression: CriteriaExpression) -> Self {
        Self {
            expressions: vec![expression],
        }
    }

    /// Builds criteria from several expressions; at least one is required.
    pub fn all(expressions: impl IntoIterator<Item = CriteriaExpression>) -> PlannerResult<Self> {
        let expressions: Vec<_> = expressions.into_iter().collect();
        if expressions.is_empty() {
            return Err(PlannerError::query_invalid(
                "custom criteria needs at least one expression",
            ));
        }
        Ok(Self { expressions })
    }

    pub fn expressions(&self) -> &[CriteriaExpression] {
        &self.expressions
    }
}

/// A node of the criteria tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaNode {
    Vault(VaultCriteria),
    Linear(LinearCriteria),
    Custom(CustomCriteria),
    And(QueryCriteria, QueryCriteria),
    Or(QueryCriteria, QueryCriteria),
}

/// Immutable, cheaply cloneable criteria tree.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCriteria(Arc<CriteriaNode>);

impl QueryCriteria {
    fn from_node(node: CriteriaNode) -> Self {
        Self(Arc::new(node))
    }

    pub fn vault(criteria: VaultCriteria) -> Self {
        Self::from_node(CriteriaNode::Vault(criteria))
    }

    /// Status-only criteria.
    pub fn status(status: StateStatus) -> Self {
        Self::vault(VaultCriteria::new(status))
    }

    pub fn linear(criteria: LinearCriteria) -> Self {
        Self::from_node(CriteriaNode::Linear(criteria))
    }

    /// Custom criteria holding one expression.
    pub fn custom(expression: CriteriaExpression) -> Self {
        Self::from_node(CriteriaNode::Custom(CustomCriteria::new(expression)))
    }

    pub fn custom_all(
        expressions: impl IntoIterator<Item = CriteriaExpression>,
    ) -> PlannerResult<Self> {
        Ok(Self::from_node(CriteriaNode::Custom(CustomCriteria::all(
            expressions,
        )?)))
    }

    pub fn and(&self, other: &QueryCriteria) -> QueryCriteria {
        Self::from_node(CriteriaNode::And(self.clone(), other.clone()))
    }

    pub fn or(&self, other: &QueryCriteria) -> QueryCriteria {
        Self::from_node(CriteriaNode::Or(self.clone(), other.clone()))
    }

    pub fn node(&self) -> &CriteriaNode {
        &self.0
    }

    /// Returns true if both handles share the same tree.
    pub fn ptr_eq(&self, other: &QueryCriteria) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Expressions of all custom leaves, left to right.
    pub fn expressions(&self) -> Vec<&CriteriaExpression> {
        let mut out = Vec::new();
        self.collect_expressions(&mut out);
        out
    }

    fn collect_expressions<'a>(&'a self, out: &mut Vec<&'a CriteriaExpression>) {
        match self.node() {
            CriteriaNode::Custom(custom) => out.extend(custom.expressions()),
            CriteriaNode::And(l, r) | CriteriaNode::Or(l, r) => {
                l.collect_expressions(out);
                r.collect_expressions(out);
            }
            CriteriaNode::Vault(_) | CriteriaNode::Linear(_) => {}
        }
    }

    /// Returns true if any vault leaf states a status.
    pub fn has_status(&self) -> bool {
        match self.node() {
            CriteriaNode::Vault(_) => true,
            CriteriaNode::And(l, r) | CriteriaNode::Or(l, r) => l.has_status() || r.has_status(),
            CriteriaNode::Linear(_) | CriteriaNode::Custom(_) => false,
        }
    }
}

impl Default for QueryCriteria {
    fn default() -> Self {
        Self::vault(VaultCriteria::default())
    }
}

/// Conjunction of two criteria.
pub fn and(left: &QueryCriteria, right: &QueryCriteria) -> QueryCriteria {
    left.and(right)
}

/// Disjunction of two criteria.
pub fn or(left: &QueryCriteria, right: &QueryCriteria) -> QueryCriteria {
    left.or(right)
}

impl fmt::Display for QueryCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            CriteriaNode::Vault(v) => {
                write!(f, "status={}", v.status)?;
                if let Some(types) = &v.contract_types {
                    let names: Vec<&str> = types.iter().map(RecordType::as_str).collect();
                    write!(f, " types=[{}]", names.join(", "))?;
                }
                Ok(())
            }
            CriteriaNode::Linear(l) => {
                let mut parts = Vec::new();
                if let Some(p) = &l.participants {
                    parts.push(format!("participants={}", p.len()));
                }
                if let Some(ids) = &l.linear_ids {
                    parts.push(format!("linear_ids={}", ids.len()));
                }
                if let Some(refs) = &l.deal_references {
                    parts.push(format!("deal_refs=[{}]", refs.join(", ")));
                }
                write!(f, "linear({})", parts.join(" "))
            }
            CriteriaNode::Custom(c) => {
                let exprs: Vec<String> = c.expressions().iter().map(ToString::to_string).collect();
                write!(f, "custom({})", exprs.join("; "))
            }
            CriteriaNode::And(l, r) => write!(f, "({} AND {})", l, r),
            CriteriaNode::Or(l, r) => write!(f, "({} OR {})", l, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;

    #[test]
    fn test_combinators_do_not_mutate_operands() {
        let a = QueryCriteria::status(StateStatus::Consumed);
        let b = QueryCriteria::linear(LinearCriteria::new().with_deal_references(["123"]));
        let before = a.clone();

        let combined = a.and(&b);
        assert_eq!(a, before);
        match combined.node() {
            CriteriaNode::And(l, r) => {
                assert!(l.ptr_eq(&a));
                assert!(r.ptr_eq(&b));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_subtree_shared_across_queries() {
        let shared = QueryCriteria::status(StateStatus::All);
        let q1 = and(&shared, &QueryCriteria::linear(LinearCriteria::new()));
        let q2 = or(&shared, &QueryCriteria::linear(LinearCriteria::new()));
        let left_of = |q: &QueryCriteria| match q.node() {
            CriteriaNode::And(l, _) | CriteriaNode::Or(l, _) => l.clone(),
            _ => panic!("not composite"),
        };
        assert!(left_of(&q1).ptr_eq(&left_of(&q2)));
    }

    #[test]
    fn test_expressions_in_leaf_order() {
        let pennies = Attribute::custom("CashSchemaV1", "pennies");
        let criteria = QueryCriteria::custom(pennies.sum())
            .and(&QueryCriteria::custom(pennies.count()))
            .and(&QueryCriteria::custom(pennies.max()));
        let names: Vec<String> = criteria
            .expressions()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "sum(CashSchemaV1.pennies)",
                "count(CashSchemaV1.pennies)",
                "max(CashSchemaV1.pennies)"
            ]
        );
    }

    #[test]
    fn test_empty_custom_criteria_rejected() {
        assert!(QueryCriteria::custom_all(Vec::new()).is_err());
    }

    #[test]
    fn test_has_status() {
        let linear = QueryCriteria::linear(LinearCriteria::new());
        assert!(!linear.has_status());
        assert!(linear.or(&QueryCriteria::status(StateStatus::All)).has_status());
    }
}
