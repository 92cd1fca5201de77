//! Schema registration errors

use thiserror::Error;

use crate::contract::RecordType;

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Failures while building the schema registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Schema '{0}' is already registered")]
    DuplicateSchema(String),

    #[error("Schema '{schema}' maps unregistered contract type '{record_type}'")]
    UnknownContractType {
        schema: String,
        record_type: RecordType,
    },

    #[error("Schema '{0}' maps no contract type")]
    NoMappedTypes(String),

    #[error("Schema '{schema}' declares field '{field}' twice")]
    DuplicateField { schema: String, field: String },
}
