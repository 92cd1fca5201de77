//! Schema registry
//!
//! Maps (schema, field) to a typed accessor. The table is built once, when
//! schemas are registered, and only read afterwards; nothing is discovered
//! at query time.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::attribute::{Attribute, StandardAttribute};
use super::errors::{SchemaError, SchemaResult};
use super::value::{AttributeValue, FieldKind};
use crate::contract::{ContractState, RecordType, StateAndRef, StateMetadata, TypeRegistry};
use crate::planner::{PlannerError, PlannerResult};

/// A persisted representation of one or more contract types.
///
/// Fields keep declaration order. A schema may extend a parent schema, in
/// which case the parent's fields come first.
#[derive(Debug, Clone)]
pub struct MappedSchema {
    name: String,
    version: u32,
    mapped_types: BTreeSet<RecordType>,
    fields: Vec<(String, FieldKind)>,
    parent: Option<Arc<MappedSchema>>,
}

impl MappedSchema {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            mapped_types: BTreeSet::new(),
            fields: Vec::new(),
            parent: None,
        }
    }

    /// Declares a concrete contract type persisted through this schema.
    pub fn mapping(mut self, record_type: RecordType) -> Self {
        self.mapped_types.insert(record_type);
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push((name.into(), kind));
        self
    }

    pub fn extending(mut self, parent: Arc<MappedSchema>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn mapped_types(&self) -> &BTreeSet<RecordType> {
        &self.mapped_types
    }

    pub fn parent(&self) -> Option<&Arc<MappedSchema>> {
        self.parent.as_ref()
    }

    /// Fields of the parent chain followed by this schema's own fields.
    /// A redeclared field keeps its original position and takes the new kind.
    pub fn fields_including_parents(&self) -> Vec<(String, FieldKind)> {
        let mut fields = self
            .parent
            .as_ref()
            .map(|p| p.fields_including_parents())
            .unwrap_or_default();

        for (name, kind) in &self.fields {
            match fields.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = *kind,
                None => fields.push((name.clone(), *kind)),
            }
        }
        fields
    }
}

/// Typed read access to one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessor {
    pub schema: String,
    pub field: String,
    pub kind: FieldKind,
    pub mapped_types: BTreeSet<RecordType>,
}

impl FieldAccessor {
    /// Reads the field from a state.
    ///
    /// Returns `None` when the state's type is not persisted through this
    /// schema. A missing or mistyped value reads as null.
    pub fn read(&self, state: &ContractState) -> Option<AttributeValue> {
        if !self.mapped_types.contains(&state.contract_type) {
            return None;
        }
        match state.field(&self.field) {
            Some(value) if self.kind.accepts(value) => Some(value.clone()),
            _ => Some(AttributeValue::Null),
        }
    }
}

/// An attribute bound to the concrete way of reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAttribute {
    Standard(StandardAttribute),
    Custom(Arc<FieldAccessor>),
}

impl ResolvedAttribute {
    pub fn kind(&self) -> FieldKind {
        match self {
            ResolvedAttribute::Standard(s) => s.kind(),
            ResolvedAttribute::Custom(accessor) => accessor.kind,
        }
    }

    /// Reads the attribute; `None` if the state is outside the attribute's schema.
    pub fn read(&self, state: &StateAndRef, metadata: &StateMetadata) -> Option<AttributeValue> {
        match self {
            ResolvedAttribute::Standard(s) => Some(s.read(state, metadata)),
            ResolvedAttribute::Custom(accessor) => accessor.read(&state.state),
        }
    }

    pub fn attribute(&self) -> Attribute {
        match self {
            ResolvedAttribute::Standard(s) => Attribute::Standard(*s),
            ResolvedAttribute::Custom(accessor) => {
                Attribute::custom(accessor.schema.clone(), accessor.field.clone())
            }
        }
    }
}

/// Registry of contract types and the schemas that persist them.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: TypeRegistry,
    schemas: BTreeMap<String, Arc<MappedSchema>>,
    accessors: BTreeMap<String, BTreeMap<String, Arc<FieldAccessor>>>,
}

impl SchemaRegistry {
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            schemas: BTreeMap::new(),
            accessors: BTreeMap::new(),
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Registers a schema and builds accessors for all of its fields.
    pub fn register(&mut self, schema: MappedSchema) -> SchemaResult<Arc<MappedSchema>> {
        if self.schemas.contains_key(schema.name()) {
            return Err(SchemaError::DuplicateSchema(schema.name().to_string()));
        }
        if schema.mapped_types().is_empty() {
            return Err(SchemaError::NoMappedTypes(schema.name().to_string()));
        }
        if let Some(unknown) = schema
            .mapped_types()
            .iter()
            .find(|t| !self.types.is_concrete(t))
        {
            return Err(SchemaError::UnknownContractType {
                schema: schema.name().to_string(),
                record_type: unknown.clone(),
            });
        }

        let mut own = BTreeSet::new();
        for (field, _) in &schema.fields {
            if !own.insert(field.as_str()) {
                return Err(SchemaError::DuplicateField {
                    schema: schema.name().to_string(),
                    field: field.clone(),
                });
            }
        }

        let accessors = schema
            .fields_including_parents()
            .into_iter()
            .map(|(field, kind)| {
                let accessor = FieldAccessor {
                    schema: schema.name().to_string(),
                    field: field.clone(),
                    kind,
                    mapped_types: schema.mapped_types().clone(),
                };
                (field, Arc::new(accessor))
            })
            .collect();

        let schema = Arc::new(schema);
        self.accessors.insert(schema.name().to_string(), accessors);
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    pub fn schema(&self, name: &str) -> Option<&Arc<MappedSchema>> {
        self.schemas.get(name)
    }

    /// Binds an attribute for a query whose concrete type scope is `scope`.
    ///
    /// Custom attributes must name a registered field of a schema that maps
    /// at least one type in scope.
    pub fn resolve(
        &self,
        attribute: &Attribute,
        scope: &BTreeSet<RecordType>,
    ) -> PlannerResult<ResolvedAttribute> {
        match attribute {
            Attribute::Standard(s) => Ok(ResolvedAttribute::Standard(*s)),
            Attribute::Custom { schema, field } => {
                let fields = self.accessors.get(schema).ok_or_else(|| {
                    PlannerError::unknown_attribute(attribute, "schema is not registered")
                })?;
                let accessor = fields.get(field).ok_or_else(|| {
                    PlannerError::unknown_attribute(attribute, "schema has no such field")
                })?;
                if accessor.mapped_types.is_disjoint(scope) {
                    return Err(PlannerError::unknown_attribute(
                        attribute,
                        "schema maps none of the queried contract types",
                    ));
                }
                Ok(ResolvedAttribute::Custom(Arc::clone(accessor)))
            }
        }
    }
}
