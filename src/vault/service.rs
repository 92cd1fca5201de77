//! Vault query service
//!
//! `query_by` evaluates a query once against the latest commit.
//! `track_by` does the same and also opens a live feed of later commits.
//!
//! Consistency of `track_by`: the snapshot is read and the subscription is
//! registered while the store's read lock is held. Commits publish under
//! the write lock, so every commit lands either wholly inside the snapshot
//! or wholly in the feed, never both and never neither.

use std::sync::Arc;

use crate::config::VaultConfig;
use crate::executor::{Page, QueryExecutor};
use crate::mvcc::ReadView;
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::planner::{ExplainPlan, QueryPlan, QueryPlanner, VaultQuery};
use crate::realtime::{UpdateFilter, UpdatePublisher, UpdateSubscription};
use crate::schema::SchemaRegistry;
use crate::storage::VaultStore;

use super::errors::{VaultQueryError, VaultQueryResult};

/// A snapshot page plus the feed of everything committed after it.
#[derive(Debug)]
pub struct PageAndUpdates {
    pub current: Page,
    /// Updates for commits after `snapshot`, scoped to the queried types
    pub future: UpdateSubscription,
    /// Commit point `current` reflects
    pub snapshot: ReadView,
}

/// Query façade over a vault store
#[derive(Debug, Clone)]
pub struct VaultQueryService {
    store: Arc<VaultStore>,
    config: VaultConfig,
}

impl VaultQueryService {
    pub fn new(store: Arc<VaultStore>, config: VaultConfig) -> Self {
        Self { store, config }
    }

    /// Opens an empty store over `schemas`, sized by `config`.
    pub fn open(schemas: SchemaRegistry, config: VaultConfig) -> Self {
        let metrics = Arc::new(MetricsRegistry::new());
        let publisher = UpdatePublisher::new(config.max_subscribers, Arc::clone(&metrics));
        let store = VaultStore::new(Arc::new(schemas), publisher, metrics);
        Self::new(Arc::new(store), config)
    }

    pub fn store(&self) -> &Arc<VaultStore> {
        &self.store
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        self.store.metrics()
    }

    /// Renders the plan `query` would run with, or why it is rejected.
    pub fn explain(&self, query: &VaultQuery) -> ExplainPlan {
        self.planner().explain(query)
    }

    /// Evaluates `query` against the latest commit.
    pub fn query_by(&self, query: &VaultQuery) -> VaultQueryResult<Page> {
        let plan = self.plan(query)?;
        let page = self.execute(query, &plan)?;

        self.metrics().increment_queries_executed();
        Logger::event(
            Event::QueryExecuted,
            &[
                ("other_results", page.other_results.len().to_string().as_str()),
                ("query", query.to_string().as_str()),
                ("returned", page.len().to_string().as_str()),
                ("total", page.total_states_available.to_string().as_str()),
            ],
        );
        Ok(page)
    }

    /// Evaluates `query` and subscribes to later commits in one step.
    ///
    /// Fails as a whole: a page is never returned without its feed.
    pub fn track_by(&self, query: &VaultQuery) -> VaultQueryResult<PageAndUpdates> {
        let plan = self.plan(query)?;

        let (current, future, snapshot) = {
            let view = self
                .store
                .snapshot()
                .map_err(|e| self.rejected(query, e.into()))?;
            let current = QueryExecutor::new(&view)
                .execute(&plan)
                .map_err(|e| self.rejected(query, e.into()))?;
            let future = self
                .store
                .publisher()
                .subscribe(UpdateFilter::for_types(plan.scope.clone()))
                .map_err(|e| self.rejected(query, e.into()))?;
            (current, future, view.read_view())
        };

        self.metrics().increment_queries_executed();
        self.metrics().increment_tracks_started();
        Logger::event(
            Event::TrackStarted,
            &[
                ("query", query.to_string().as_str()),
                ("returned", current.len().to_string().as_str()),
                ("snapshot", snapshot.upper_bound().value().to_string().as_str()),
                ("subscription_id", future.id().to_string().as_str()),
            ],
        );

        Ok(PageAndUpdates {
            current,
            future,
            snapshot,
        })
    }

    fn planner(&self) -> QueryPlanner<'_> {
        QueryPlanner::new(self.store.schemas()).with_max_page_size(self.config.max_page_size)
    }

    fn plan(&self, query: &VaultQuery) -> VaultQueryResult<QueryPlan> {
        let planned = self.planner().plan(query);
        if self.config.explain_queries {
            let explain = match &planned {
                Ok(plan) => ExplainPlan::from_plan(plan),
                Err(err) => ExplainPlan::from_error(err),
            };
            Logger::event(
                Event::QueryExplain,
                &[
                    ("plan", explain.to_string().as_str()),
                    ("query", query.to_string().as_str()),
                ],
            );
        }
        planned.map_err(|e| self.rejected(query, e.into()))
    }

    fn execute(&self, query: &VaultQuery, plan: &QueryPlan) -> VaultQueryResult<Page> {
        let view = self
            .store
            .snapshot()
            .map_err(|e| self.rejected(query, e.into()))?;
        QueryExecutor::new(&view)
            .execute(plan)
            .map_err(|e| self.rejected(query, e.into()))
    }

    fn rejected(&self, query: &VaultQuery, err: VaultQueryError) -> VaultQueryError {
        self.metrics().increment_queries_rejected();
        Logger::event(
            Event::QueryRejected,
            &[
                ("code", err.code()),
                ("query", query.to_string().as_str()),
                ("reason", err.to_string().as_str()),
            ],
        );
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractState, RecordType, StateStatus, TypeRegistry};
    use crate::criteria::{PageSpecification, QueryCriteria};
    use crate::storage::VaultTransaction;

    fn service(config: VaultConfig) -> VaultQueryService {
        let mut types = TypeRegistry::new();
        types.register_concrete(RecordType::new("Cash"), [RecordType::fungible_asset()]);
        VaultQueryService::open(SchemaRegistry::new(types), config)
    }

    fn issue(service: &VaultQueryService, count: usize) {
        let mut tx = VaultTransaction::new();
        for _ in 0..count {
            tx = tx.producing(ContractState::new(RecordType::new("Cash")));
        }
        service.store().record(tx).unwrap();
    }

    #[test]
    fn test_query_by_counts_metrics() {
        let service = service(VaultConfig::default());
        issue(&service, 3);

        let page = service.query_by(&VaultQuery::new(RecordType::new("Cash"))).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(service.metrics().snapshot().queries_executed, 1);

        let err = service
            .query_by(
                &VaultQuery::new(RecordType::new("Cash"))
                    .with_paging(PageSpecification::new(0, 513)),
            )
            .unwrap_err();
        assert!(matches!(err, VaultQueryError::Paging(_)));
        assert_eq!(service.metrics().snapshot().queries_rejected, 1);
    }

    #[test]
    fn test_configured_page_bound() {
        let service = service(VaultConfig::default().with_max_page_size(10));
        let err = service
            .query_by(
                &VaultQuery::new(RecordType::new("Cash"))
                    .with_paging(PageSpecification::new(0, 11)),
            )
            .unwrap_err();
        assert_eq!(err.code(), "VAULT_PAGING_INVALID");
    }

    #[test]
    fn test_lowered_page_bound_applies_to_default_paging() {
        let service = service(VaultConfig::default().with_max_page_size(2));
        issue(&service, 3);

        let page = service.query_by(&VaultQuery::new(RecordType::new("Cash"))).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total_states_available, 3);
    }

    #[test]
    fn test_track_by_sees_later_commits_only() {
        let service = service(VaultConfig::default().with_explain_queries(true));
        issue(&service, 2);

        let mut tracked = service
            .track_by(&VaultQuery::new(RecordType::new("Cash")))
            .unwrap();
        assert_eq!(tracked.current.len(), 2);
        assert!(tracked.future.try_recv().is_none());

        issue(&service, 1);
        let update = tracked.future.try_recv().unwrap();
        assert!(update.commit_id > tracked.snapshot.upper_bound());
        assert_eq!(update.produced.len(), 1);
        assert_eq!(service.metrics().snapshot().tracks_started, 1);
    }

    #[test]
    fn test_track_by_fails_whole_when_feed_refused() {
        let service = service(VaultConfig::default().with_max_subscribers(1));
        let query = VaultQuery::new(RecordType::new("Cash"))
            .with_criteria(QueryCriteria::status(StateStatus::All));

        let _held = service.track_by(&query).unwrap();
        let err = service.track_by(&query).unwrap_err();
        assert!(matches!(err, VaultQueryError::Subscription(_)));
    }

    #[test]
    fn test_closed_store() {
        let service = service(VaultConfig::default());
        service.store().close();
        let err = service
            .query_by(&VaultQuery::new(RecordType::new("Cash")))
            .unwrap_err();
        assert!(matches!(err, VaultQueryError::StoreAccess(_)));
    }
}
