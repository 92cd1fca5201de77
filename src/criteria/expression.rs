//! Attribute-level expressions carried by custom criteria

use std::fmt;

use crate::schema::{Attribute, AttributeValue};

/// Column filter operation.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Equal(AttributeValue),
    NotEqual(AttributeValue),
    GreaterThan(AttributeValue),
    GreaterThanOrEqual(AttributeValue),
    LessThan(AttributeValue),
    LessThanOrEqual(AttributeValue),
    /// Inclusive on both ends
    Between(AttributeValue, AttributeValue),
    In(Vec<AttributeValue>),
    NotIn(Vec<AttributeValue>),
    /// SQL pattern: `%` any run, `_` any single character
    Like(String),
    NotLike(String),
    IsNull,
    NotNull,
}

impl FilterOp {
    /// Returns the operation name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Equal(_) => "eq",
            FilterOp::NotEqual(_) => "neq",
            FilterOp::GreaterThan(_) => "gt",
            FilterOp::GreaterThanOrEqual(_) => "gte",
            FilterOp::LessThan(_) => "lt",
            FilterOp::LessThanOrEqual(_) => "lte",
            FilterOp::Between(_, _) => "between",
            FilterOp::In(_) => "in",
            FilterOp::NotIn(_) => "not_in",
            FilterOp::Like(_) => "like",
            FilterOp::NotLike(_) => "not_like",
            FilterOp::IsNull => "is_null",
            FilterOp::NotNull => "not_null",
        }
    }

    /// Operand values that must be kind-compatible with the filtered field.
    pub fn operands(&self) -> Vec<&AttributeValue> {
        match self {
            FilterOp::Equal(v)
            | FilterOp::NotEqual(v)
            | FilterOp::GreaterThan(v)
            | FilterOp::GreaterThanOrEqual(v)
            | FilterOp::LessThan(v)
            | FilterOp::LessThanOrEqual(v) => vec![v],
            FilterOp::Between(from, to) => vec![from, to],
            FilterOp::In(values) | FilterOp::NotIn(values) => values.iter().collect(),
            FilterOp::Like(_) | FilterOp::NotLike(_) | FilterOp::IsNull | FilterOp::NotNull => {
                Vec::new()
            }
        }
    }

    /// Returns true if the operation only makes sense on text fields.
    pub fn is_pattern(&self) -> bool {
        matches!(self, FilterOp::Like(_) | FilterOp::NotLike(_))
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Between(from, to) => write!(f, "{} {} and {}", self.op_name(), from, to),
            FilterOp::In(values) | FilterOp::NotIn(values) => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} [{}]", self.op_name(), rendered.join(", "))
            }
            FilterOp::Like(p) | FilterOp::NotLike(p) => write!(f, "{} {:?}", self.op_name(), p),
            FilterOp::IsNull | FilterOp::NotNull => f.write_str(self.op_name()),
            _ => match self.operands().first() {
                Some(v) => write!(f, "{} {}", self.op_name(), v),
                None => f.write_str(self.op_name()),
            },
        }
    }
}

/// Aggregate reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Count,
    Max,
    Min,
    Avg,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Count => "count",
            AggregateFunction::Max => "max",
            AggregateFunction::Min => "min",
            AggregateFunction::Avg => "avg",
        }
    }

    /// Returns true if the function needs a numeric source attribute.
    pub fn requires_numeric(&self) -> bool {
        matches!(self, AggregateFunction::Sum | AggregateFunction::Avg)
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute-level expression: a row filter or an aggregate projection.
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaExpression {
    Filter {
        attribute: Attribute,
        op: FilterOp,
    },
    Aggregate {
        attribute: Attribute,
        function: AggregateFunction,
        group_by: Vec<Attribute>,
    },
}

impl CriteriaExpression {
    pub fn attribute(&self) -> &Attribute {
        match self {
            CriteriaExpression::Filter { attribute, .. }
            | CriteriaExpression::Aggregate { attribute, .. } => attribute,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, CriteriaExpression::Aggregate { .. })
    }
}

impl fmt::Display for CriteriaExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriteriaExpression::Filter { attribute, op } => write!(f, "{} {}", attribute, op),
            CriteriaExpression::Aggregate {
                attribute,
                function,
                group_by,
            } => {
                write!(f, "{}({})", function, attribute)?;
                if !group_by.is_empty() {
                    let keys: Vec<String> = group_by.iter().map(ToString::to_string).collect();
                    write!(f, " group by {}", keys.join(", "))?;
                }
                Ok(())
            }
        }
    }
}
