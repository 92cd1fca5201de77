//! Expression builder
//!
//! Filter and aggregate constructors hang off `Attribute`, so the same handle
//! builds a predicate, an aggregate or a sort column:
//!
//! ```ignore
//! let pennies = Attribute::custom("CashSchemaV1", "pennies");
//! let currency = Attribute::custom("CashSchemaV1", "currency");
//!
//! let rich = QueryCriteria::custom(pennies.greater_than_or_equal(10i64));
//! let totals = QueryCriteria::custom(pennies.sum_by([currency]));
//! ```

use super::expression::{AggregateFunction, CriteriaExpression, FilterOp};
use crate::schema::{Attribute, AttributeValue};

impl Attribute {
    fn filter(&self, op: FilterOp) -> CriteriaExpression {
        CriteriaExpression::Filter {
            attribute: self.clone(),
            op,
        }
    }

    fn aggregate(
        &self,
        function: AggregateFunction,
        group_by: impl IntoIterator<Item = Attribute>,
    ) -> CriteriaExpression {
        CriteriaExpression::Aggregate {
            attribute: self.clone(),
            function,
            group_by: group_by.into_iter().collect(),
        }
    }

    pub fn equal(&self, value: impl Into<AttributeValue>) -> CriteriaExpression {
        self.filter(FilterOp::Equal(value.into()))
    }

    pub fn not_equal(&self, value: impl Into<AttributeValue>) -> CriteriaExpression {
        self.filter(FilterOp::NotEqual(value.into()))
    }

    pub fn greater_than(&self, value: impl Into<AttributeValue>) -> CriteriaExpression {
        self.filter(FilterOp::GreaterThan(value.into()))
    }

    pub fn greater_than_or_equal(&self, value: impl Into<AttributeValue>) -> CriteriaExpression {
        self.filter(FilterOp::GreaterThanOrEqual(value.into()))
    }

    pub fn less_than(&self, value: impl Into<AttributeValue>) -> CriteriaExpression {
        self.filter(FilterOp::LessThan(value.into()))
    }

    pub fn less_than_or_equal(&self, value: impl Into<AttributeValue>) -> CriteriaExpression {
        self.filter(FilterOp::LessThanOrEqual(value.into()))
    }

    pub fn between(
        &self,
        from: impl Into<AttributeValue>,
        to: impl Into<AttributeValue>,
    ) -> CriteriaExpression {
        self.filter(FilterOp::Between(from.into(), to.into()))
    }

    pub fn in_values<V: Into<AttributeValue>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> CriteriaExpression {
        self.filter(FilterOp::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn not_in<V: Into<AttributeValue>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> CriteriaExpression {
        self.filter(FilterOp::NotIn(values.into_iter().map(Into::into).collect()))
    }

    pub fn like(&self, pattern: impl Into<String>) -> CriteriaExpression {
        self.filter(FilterOp::Like(pattern.into()))
    }

    pub fn not_like(&self, pattern: impl Into<String>) -> CriteriaExpression {
        self.filter(FilterOp::NotLike(pattern.into()))
    }

    pub fn is_null(&self) -> CriteriaExpression {
        self.filter(FilterOp::IsNull)
    }

    pub fn not_null(&self) -> CriteriaExpression {
        self.filter(FilterOp::NotNull)
    }

    pub fn sum(&self) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Sum, [])
    }

    pub fn sum_by(&self, group_by: impl IntoIterator<Item = Attribute>) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Sum, group_by)
    }

    pub fn count(&self) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Count, [])
    }

    pub fn count_by(&self, group_by: impl IntoIterator<Item = Attribute>) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Count, group_by)
    }

    pub fn max(&self) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Max, [])
    }

    pub fn max_by(&self, group_by: impl IntoIterator<Item = Attribute>) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Max, group_by)
    }

    pub fn min(&self) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Min, [])
    }

    pub fn min_by(&self, group_by: impl IntoIterator<Item = Attribute>) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Min, group_by)
    }

    pub fn avg(&self) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Avg, [])
    }

    pub fn avg_by(&self, group_by: impl IntoIterator<Item = Attribute>) -> CriteriaExpression {
        self.aggregate(AggregateFunction::Avg, group_by)
    }
}
