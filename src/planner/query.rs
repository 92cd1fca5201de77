//! Query request accepted by the planner

use std::collections::BTreeSet;
use std::fmt;

use crate::contract::RecordType;
use crate::criteria::{PageSpecification, QueryCriteria, Sort};

/// A vault query: contract type scope, criteria, paging and sort.
///
/// Defaults: unconsumed states, first page at the planner's page size
/// ceiling, storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultQuery {
    pub contract_types: BTreeSet<RecordType>,
    pub criteria: QueryCriteria,
    /// `None` asks for the first page at the largest allowed size.
    pub paging: Option<PageSpecification>,
    pub sort: Sort,
}

impl VaultQuery {
    pub fn new(contract_type: RecordType) -> Self {
        Self::for_types([contract_type])
    }

    /// Query over states satisfying any of `types`.
    pub fn for_types(types: impl IntoIterator<Item = RecordType>) -> Self {
        Self {
            contract_types: types.into_iter().collect(),
            criteria: QueryCriteria::default(),
            paging: None,
            sort: Sort::default(),
        }
    }

    pub fn with_criteria(mut self, criteria: QueryCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_paging(mut self, paging: PageSpecification) -> Self {
        self.paging = Some(paging);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }
}

impl fmt::Display for VaultQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self.contract_types.iter().map(RecordType::as_str).collect();
        write!(f, "[{}] where {}", types.join(", "), self.criteria)
    }
}
