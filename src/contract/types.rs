//! Record types and the type hierarchy
//!
//! A concrete contract type satisfies itself, every supertype it was
//! registered with (transitively), and the root `ContractState` type.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A type tag a state may satisfy (e.g. `Cash`, `FungibleAsset`, `LinearState`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordType(String);

impl RecordType {
    /// Root type satisfied by every state.
    pub const CONTRACT_STATE: &'static str = "ContractState";
    pub const LINEAR_STATE: &'static str = "LinearState";
    pub const DEAL_STATE: &'static str = "DealState";
    pub const FUNGIBLE_ASSET: &'static str = "FungibleAsset";
    pub const OWNABLE_STATE: &'static str = "OwnableState";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn contract_state() -> Self {
        Self::new(Self::CONTRACT_STATE)
    }

    pub fn linear_state() -> Self {
        Self::new(Self::LINEAR_STATE)
    }

    pub fn deal_state() -> Self {
        Self::new(Self::DEAL_STATE)
    }

    pub fn fungible_asset() -> Self {
        Self::new(Self::FUNGIBLE_ASSET)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == Self::CONTRACT_STATE
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Registry of concrete contract types and the supertypes they satisfy.
///
/// Built once before the store is opened and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    /// Direct supertypes declared for each registered type (concrete or abstract)
    parents: BTreeMap<RecordType, BTreeSet<RecordType>>,
    /// Types that stored states may carry
    concrete: BTreeSet<RecordType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an abstract type (interface) and its direct supertypes.
    pub fn register_abstract(
        &mut self,
        record_type: RecordType,
        supertypes: impl IntoIterator<Item = RecordType>,
    ) {
        self.parents
            .entry(record_type)
            .or_default()
            .extend(supertypes);
    }

    /// Declares a concrete contract type and its direct supertypes.
    pub fn register_concrete(
        &mut self,
        record_type: RecordType,
        supertypes: impl IntoIterator<Item = RecordType>,
    ) {
        self.concrete.insert(record_type.clone());
        self.register_abstract(record_type, supertypes);
    }

    /// Returns true if states may be stored with this type.
    pub fn is_concrete(&self, record_type: &RecordType) -> bool {
        self.concrete.contains(record_type)
    }

    /// Returns true if the type is known at all.
    pub fn is_known(&self, record_type: &RecordType) -> bool {
        record_type.is_root() || self.parents.contains_key(record_type)
    }

    /// All type tags satisfied by `record_type`, itself and the root included.
    pub fn closure(&self, record_type: &RecordType) -> BTreeSet<RecordType> {
        let mut seen = BTreeSet::new();
        let mut pending = vec![record_type.clone()];

        while let Some(next) = pending.pop() {
            if !seen.insert(next.clone()) {
                continue;
            }
            if let Some(parents) = self.parents.get(&next) {
                pending.extend(parents.iter().cloned());
            }
        }

        seen.insert(RecordType::contract_state());
        seen
    }

    /// Returns true if a state of concrete type `concrete` satisfies `target`.
    pub fn satisfies(&self, concrete: &RecordType, target: &RecordType) -> bool {
        target.is_root() || self.closure(concrete).contains(target)
    }

    /// Concrete types whose states satisfy `target`.
    pub fn concrete_types_satisfying(&self, target: &RecordType) -> BTreeSet<RecordType> {
        self.concrete
            .iter()
            .filter(|c| self.satisfies(c, target))
            .cloned()
            .collect()
    }

    /// Concrete types whose states satisfy any of `targets`.
    pub fn concrete_types_satisfying_any<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a RecordType>,
    ) -> BTreeSet<RecordType> {
        let mut result = BTreeSet::new();
        for target in targets {
            result.extend(self.concrete_types_satisfying(target));
        }
        result
    }

    pub fn concrete_types(&self) -> impl Iterator<Item = &RecordType> {
        self.concrete.iter()
    }
}
