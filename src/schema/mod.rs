//! Attribute access for vault queries
//!
//! Resolves logical attribute names to typed accessors:
//!
//! - Standard attributes are defined by the engine and exist on every state
//! - Custom attributes name a field of a registered `MappedSchema`
//!
//! Both are referenced through the same `Attribute` handle, so sorts, filters
//! and aggregates never need to tell them apart.

mod attribute;
mod errors;
mod registry;
mod value;

pub use attribute::{Attribute, StandardAttribute};
pub use errors::{SchemaError, SchemaResult};
pub use registry::{FieldAccessor, MappedSchema, ResolvedAttribute, SchemaRegistry};
pub use value::{AttributeValue, FieldKind};
