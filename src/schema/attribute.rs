//! Attribute handles
//!
//! `Attribute` is the single handle type used by sorts, filters and
//! aggregates, whether it names an engine-defined column or a field of a
//! registered schema.

use std::fmt;

use super::value::{AttributeValue, FieldKind};
use crate::contract::{StateAndRef, StateMetadata};

/// Columns every stored state exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StandardAttribute {
    /// Producing transaction hash (hex)
    TxId,
    /// Output index within the producing transaction
    OutputIndex,
    ContractType,
    StateStatus,
    RecordedTime,
    ConsumedTime,
    /// Linear id uuid (linear states only)
    LinearUuid,
    /// Linear id external label (linear states only)
    ExternalId,
    /// Deal reference (deal states only)
    DealReference,
}

impl StandardAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardAttribute::TxId => "tx_id",
            StandardAttribute::OutputIndex => "output_index",
            StandardAttribute::ContractType => "contract_type",
            StandardAttribute::StateStatus => "state_status",
            StandardAttribute::RecordedTime => "recorded_time",
            StandardAttribute::ConsumedTime => "consumed_time",
            StandardAttribute::LinearUuid => "linear_uuid",
            StandardAttribute::ExternalId => "external_id",
            StandardAttribute::DealReference => "deal_reference",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            StandardAttribute::OutputIndex => FieldKind::Int,
            StandardAttribute::RecordedTime | StandardAttribute::ConsumedTime => FieldKind::Time,
            _ => FieldKind::Text,
        }
    }

    /// Reads the column for a stored state. Absent values read as null.
    pub fn read(&self, state: &StateAndRef, metadata: &StateMetadata) -> AttributeValue {
        match self {
            StandardAttribute::TxId => AttributeValue::Text(state.reference.txhash.to_hex()),
            StandardAttribute::OutputIndex => AttributeValue::from(state.reference.index),
            StandardAttribute::ContractType => {
                AttributeValue::from(state.state.contract_type.as_str())
            }
            StandardAttribute::StateStatus => AttributeValue::from(metadata.status.as_str()),
            StandardAttribute::RecordedTime => AttributeValue::Time(metadata.recorded_time),
            StandardAttribute::ConsumedTime => AttributeValue::from(metadata.consumed_time),
            StandardAttribute::LinearUuid => AttributeValue::from(
                state.state.linear_id.as_ref().map(|id| id.id.to_string()),
            ),
            StandardAttribute::ExternalId => AttributeValue::from(
                state
                    .state
                    .linear_id
                    .as_ref()
                    .and_then(|id| id.external_id.clone()),
            ),
            StandardAttribute::DealReference => {
                AttributeValue::from(state.state.deal_reference.clone())
            }
        }
    }
}

/// Logical reference to a column: engine-defined or schema-specific.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Standard(StandardAttribute),
    Custom { schema: String, field: String },
}

impl Attribute {
    pub fn standard(attribute: StandardAttribute) -> Self {
        Attribute::Standard(attribute)
    }

    pub fn custom(schema: impl Into<String>, field: impl Into<String>) -> Self {
        Attribute::Custom {
            schema: schema.into(),
            field: field.into(),
        }
    }
}

impl From<StandardAttribute> for Attribute {
    fn from(attribute: StandardAttribute) -> Self {
        Attribute::Standard(attribute)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Standard(a) => f.write_str(a.as_str()),
            Attribute::Custom { schema, field } => write!(f, "{}.{}", schema, field),
        }
    }
}
