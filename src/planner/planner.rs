//! Query planner
//!
//! Compiles a `VaultQuery` into an immutable `QueryPlan`:
//!
//! 1. Validate paging
//! 2. Resolve the requested contract types to concrete types (the scope)
//! 3. Compile the criteria tree into a row predicate, extracting aggregates
//! 4. Derive the scan pushdown (concrete types and status)
//! 5. Resolve sort keys, or the group ordering when aggregating
//!
//! Planning never touches the store. Every validation error surfaces here.

use std::collections::BTreeSet;

use super::errors::{PlannerError, PlannerResult};
use super::explain::ExplainPlan;
use super::predicate::{CompiledFilter, LinearPredicate, RowPredicate};
use super::query::VaultQuery;
use crate::contract::{RecordType, StateStatus};
use crate::criteria::{
    AggregateFunction, CriteriaExpression, CriteriaNode, Direction, FilterOp,
    PageSpecification, QueryCriteria, Sort, DEFAULT_PAGE_NUM, MAX_PAGE_SIZE,
};
use crate::schema::{Attribute, FieldKind, ResolvedAttribute, SchemaRegistry};

/// A resolved sort key.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub attribute: ResolvedAttribute,
    pub direction: Direction,
}

/// One aggregate projection.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub function: AggregateFunction,
    pub source: ResolvedAttribute,
    /// Indexes into `AggregationPlan::group_keys`, in declaration order
    pub group_by: Vec<usize>,
    pub label: String,
}

/// Grouped aggregation stage.
#[derive(Debug, Clone)]
pub struct AggregationPlan {
    /// Aggregates in leaf order
    pub aggregates: Vec<AggregateSpec>,
    /// Union of all group-by attributes, first-seen order
    pub group_keys: Vec<ResolvedAttribute>,
    /// Group ordering: explicit sort columns first, then remaining keys ascending
    pub group_order: Vec<(usize, Direction)>,
}

/// Immutable query plan (no runtime state)
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Contract types named by the query
    pub requested_types: BTreeSet<RecordType>,
    /// Concrete types satisfying the requested types
    pub scope: BTreeSet<RecordType>,
    /// Concrete types to scan after intersecting with criteria type filters
    pub scan_types: BTreeSet<RecordType>,
    /// Status pushed down to the scan
    pub scan_status: StateStatus,
    pub predicate: RowPredicate,
    pub aggregation: Option<AggregationPlan>,
    pub sort: Vec<SortKey>,
    pub paging: PageSpecification,
}

impl QueryPlan {
    pub fn is_aggregation(&self) -> bool {
        self.aggregation.is_some()
    }
}

/// Query planner bound to a schema registry
pub struct QueryPlanner<'a> {
    schemas: &'a SchemaRegistry,
    max_page_size: i32,
}

impl<'a> QueryPlanner<'a> {
    /// Creates a planner with the default page size ceiling
    pub fn new(schemas: &'a SchemaRegistry) -> Self {
        Self {
            schemas,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    /// Lowers the page size ceiling. It never rises above `MAX_PAGE_SIZE`.
    pub fn with_max_page_size(mut self, max_page_size: i32) -> Self {
        self.max_page_size = max_page_size.min(MAX_PAGE_SIZE);
        self
    }

    /// Plans a query.
    ///
    /// Deterministic: the same query against the same registry yields the
    /// same plan.
    pub fn plan(&self, query: &VaultQuery) -> PlannerResult<QueryPlan> {
        let paging = query
            .paging
            .unwrap_or_else(|| PageSpecification::new(DEFAULT_PAGE_NUM, self.max_page_size));
        paging.validate(self.max_page_size)?;

        let scope = self.resolve_scope(&query.contract_types)?;

        let mut compiler = CriteriaCompiler {
            schemas: self.schemas,
            scope: &scope,
            aggregates: Vec::new(),
        };
        let compiled = compiler.compile(&query.criteria)?;

        let (mut predicate, mut status, types) = match compiled {
            Some(c) => (c.predicate, c.status, c.types),
            None => (RowPredicate::Always, None, None),
        };
        if !query.criteria.has_status() {
            let default = RowPredicate::Status(StateStatus::Unconsumed);
            predicate = match predicate {
                RowPredicate::Always => default,
                other => RowPredicate::and(default, other),
            };
            status = Some(StateStatus::Unconsumed);
        }

        let scan_types = match types {
            Some(allowed) => scope.intersection(&allowed).cloned().collect(),
            None => scope.clone(),
        };

        let (aggregation, sort) = if compiler.aggregates.is_empty() {
            (None, self.resolve_sort(&query.sort, &scope)?)
        } else {
            let aggregation = plan_aggregation(compiler.aggregates, &query.sort)?;
            (Some(aggregation), Vec::new())
        };

        Ok(QueryPlan {
            requested_types: query.contract_types.clone(),
            scope,
            scan_types,
            scan_status: status.unwrap_or(StateStatus::All),
            predicate,
            aggregation,
            sort,
            paging,
        })
    }

    /// Explains a query, accepted or not.
    pub fn explain(&self, query: &VaultQuery) -> ExplainPlan {
        match self.plan(query) {
            Ok(plan) => ExplainPlan::from_plan(&plan),
            Err(err) => ExplainPlan::from_error(&err),
        }
    }

    fn resolve_scope(&self, requested: &BTreeSet<RecordType>) -> PlannerResult<BTreeSet<RecordType>> {
        if requested.is_empty() {
            return Err(PlannerError::query_invalid(
                "query names no contract type",
            ));
        }
        let types = self.schemas.types();
        if let Some(unknown) = requested.iter().find(|t| !types.is_known(t)) {
            return Err(PlannerError::query_invalid(format!(
                "contract type '{}' is not registered",
                unknown
            )));
        }
        Ok(types.concrete_types_satisfying_any(requested))
    }

    fn resolve_sort(&self, sort: &Sort, scope: &BTreeSet<RecordType>) -> PlannerResult<Vec<SortKey>> {
        sort.columns()
            .iter()
            .map(|column| {
                Ok(SortKey {
                    attribute: self.schemas.resolve(&column.attribute, scope)?,
                    direction: column.direction,
                })
            })
            .collect()
    }
}

/// Compiled subtree. Aggregate-only subtrees compile to nothing.
struct Compiled {
    predicate: RowPredicate,
    /// Status bound implied by the subtree, `None` if open
    status: Option<StateStatus>,
    /// Concrete types admitted by the subtree, `None` if open
    types: Option<BTreeSet<RecordType>>,
}

struct PendingAggregate {
    function: AggregateFunction,
    source: ResolvedAttribute,
    group_by: Vec<(Attribute, ResolvedAttribute)>,
    label: String,
}

struct CriteriaCompiler<'a> {
    schemas: &'a SchemaRegistry,
    scope: &'a BTreeSet<RecordType>,
    aggregates: Vec<PendingAggregate>,
}

impl<'a> CriteriaCompiler<'a> {
    fn compile(&mut self, criteria: &QueryCriteria) -> PlannerResult<Option<Compiled>> {
        match criteria.node() {
            CriteriaNode::Vault(vault) => {
                let status = RowPredicate::Status(vault.status);
                let (predicate, types) = match &vault.contract_types {
                    Some(named) => {
                        let allowed = self.schemas.types().concrete_types_satisfying_any(named);
                        (
                            RowPredicate::and(status, RowPredicate::TypeIn(allowed.clone())),
                            Some(allowed),
                        )
                    }
                    None => (status, None),
                };
                Ok(Some(Compiled {
                    predicate,
                    status: Some(vault.status),
                    types,
                }))
            }
            CriteriaNode::Linear(linear) => Ok(Some(Compiled {
                predicate: RowPredicate::Linear(LinearPredicate::from_criteria(linear)),
                status: None,
                types: None,
            })),
            CriteriaNode::Custom(custom) => {
                let mut filters = Vec::new();
                for expression in custom.expressions() {
                    match expression {
                        CriteriaExpression::Filter { attribute, op } => {
                            filters.push(self.compile_filter(attribute, op)?);
                        }
                        CriteriaExpression::Aggregate { .. } => self.add_aggregate(expression)?,
                    }
                }
                Ok(RowPredicate::all(filters).map(|predicate| Compiled {
                    predicate,
                    status: None,
                    types: None,
                }))
            }
            CriteriaNode::And(left, right) => {
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                Ok(combine(left, right, |l, r| Compiled {
                    predicate: RowPredicate::and(l.predicate, r.predicate),
                    status: match (l.status, r.status) {
                        (Some(a), Some(b)) => Some(intersect_status(a, b)),
                        (a, b) => a.or(b),
                    },
                    types: match (l.types, r.types) {
                        (Some(a), Some(b)) => Some(a.intersection(&b).cloned().collect()),
                        (a, b) => a.or(b),
                    },
                }))
            }
            CriteriaNode::Or(left, right) => {
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                Ok(combine(left, right, |l, r| Compiled {
                    predicate: RowPredicate::or(l.predicate, r.predicate),
                    status: match (l.status, r.status) {
                        (Some(a), Some(b)) => Some(a.union(b)),
                        _ => None,
                    },
                    types: match (l.types, r.types) {
                        (Some(a), Some(b)) => Some(a.union(&b).cloned().collect()),
                        _ => None,
                    },
                }))
            }
        }
    }

    fn compile_filter(&self, attribute: &Attribute, op: &FilterOp) -> PlannerResult<RowPredicate> {
        let resolved = self.schemas.resolve(attribute, self.scope)?;
        let kind = resolved.kind();

        if op.is_pattern() && kind != FieldKind::Text {
            return Err(PlannerError::type_mismatch(
                attribute,
                format!("{} needs a text field, found {}", op.op_name(), kind),
            ));
        }
        if let Some(bad) = op.operands().into_iter().find(|v| !kind.accepts(v)) {
            return Err(PlannerError::type_mismatch(
                attribute,
                format!("operand {} is not comparable with a {} field", bad, kind),
            ));
        }
        if let FilterOp::In(values) | FilterOp::NotIn(values) = op {
            if values.is_empty() {
                return Err(PlannerError::query_invalid(format!(
                    "{} on '{}' has an empty value list",
                    op.op_name(),
                    attribute
                )));
            }
        }

        Ok(RowPredicate::Compare {
            attribute: resolved,
            filter: CompiledFilter::compile(op.clone())?,
        })
    }

    fn add_aggregate(&mut self, expression: &CriteriaExpression) -> PlannerResult<()> {
        let CriteriaExpression::Aggregate {
            attribute,
            function,
            group_by,
        } = expression
        else {
            return Ok(());
        };

        let source = self.schemas.resolve(attribute, self.scope)?;
        if function.requires_numeric() && !source.kind().is_numeric() {
            return Err(PlannerError::type_mismatch(
                attribute,
                format!("{} needs a numeric field, found {}", function, source.kind()),
            ));
        }

        let mut keys = Vec::with_capacity(group_by.len());
        for key in group_by {
            if keys.iter().any(|(seen, _)| seen == key) {
                return Err(PlannerError::query_invalid(format!(
                    "'{}' appears twice in group by of {}",
                    key, expression
                )));
            }
            keys.push((key.clone(), self.schemas.resolve(key, self.scope)?));
        }

        self.aggregates.push(PendingAggregate {
            function: *function,
            source,
            group_by: keys,
            label: expression.to_string(),
        });
        Ok(())
    }
}

/// Combines two compiled subtrees; an aggregate-only side is neutral.
fn combine(
    left: Option<Compiled>,
    right: Option<Compiled>,
    both: impl FnOnce(Compiled, Compiled) -> Compiled,
) -> Option<Compiled> {
    match (left, right) {
        (Some(l), Some(r)) => Some(both(l, r)),
        (l, r) => l.or(r),
    }
}

/// Status bound of a conjunction. Conflicting bounds match nothing; the
/// predicate rejects every row, so either side is a valid scan bound.
fn intersect_status(a: StateStatus, b: StateStatus) -> StateStatus {
    match (a, b) {
        (StateStatus::All, other) | (other, StateStatus::All) => other,
        (left, _) => left,
    }
}

fn plan_aggregation(aggregates: Vec<PendingAggregate>, sort: &Sort) -> PlannerResult<AggregationPlan> {
    let mut key_names: Vec<Attribute> = Vec::new();
    let mut group_keys: Vec<ResolvedAttribute> = Vec::new();
    let mut specs = Vec::with_capacity(aggregates.len());

    for pending in aggregates {
        let mut indexes = Vec::with_capacity(pending.group_by.len());
        for (name, resolved) in pending.group_by {
            let index = match key_names.iter().position(|k| *k == name) {
                Some(i) => i,
                None => {
                    key_names.push(name);
                    group_keys.push(resolved);
                    key_names.len() - 1
                }
            };
            indexes.push(index);
        }
        specs.push(AggregateSpec {
            function: pending.function,
            source: pending.source,
            group_by: indexes,
            label: pending.label,
        });
    }

    let mut group_order = Vec::with_capacity(key_names.len());
    for column in sort.columns() {
        let index = key_names
            .iter()
            .position(|k| *k == column.attribute)
            .ok_or_else(|| {
                PlannerError::query_invalid(format!(
                    "sort column '{}' is not a group-by field of the aggregation",
                    column.attribute
                ))
            })?;
        group_order.push((index, column.direction));
    }
    for index in 0..key_names.len() {
        if !group_order.iter().any(|(i, _)| *i == index) {
            group_order.push((index, Direction::Asc));
        }
    }

    Ok(AggregationPlan {
        aggregates: specs,
        group_keys,
        group_order,
    })
}
