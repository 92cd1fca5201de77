//! In-memory vault store
//!
//! Holds every state ever recorded, indexed by reference and by concrete
//! type. Mutations are serialized through one write lock; the commit, its
//! `CommitId` and the publication of its `Update` all happen inside that
//! critical section. Readers take the read lock through `VaultSnapshot`,
//! so a snapshot never observes half a commit and no commit can land
//! between reading a snapshot and subscribing under the same guard.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};

use chrono::Utc;

use super::errors::{StorageError, StorageResult};
use super::record::StoredState;
use super::transaction::VaultTransaction;
use crate::contract::{RecordType, StateAndRef, StateRef, StateStatus};
use crate::executor::{ExecutorResult, StateSource};
use crate::mvcc::{CommitAuthority, ReadView};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::realtime::{Update, UpdatePublisher};
use crate::schema::SchemaRegistry;

#[derive(Debug, Default)]
struct VaultState {
    /// Storage order; a state's index is its sequence
    states: Vec<StoredState>,
    by_ref: HashMap<StateRef, usize>,
    by_type: BTreeMap<RecordType, Vec<usize>>,
    authority: CommitAuthority,
}

impl VaultState {
    /// Checks a transaction against current state without changing anything.
    fn validate(&self, tx: &VaultTransaction, schemas: &SchemaRegistry) -> StorageResult<()> {
        let mut spent = HashSet::new();
        for reference in &tx.consumed {
            let position = self
                .by_ref
                .get(reference)
                .ok_or_else(|| StorageError::unknown_state(*reference))?;
            let consumed = self
                .states
                .get(*position)
                .map_or(true, StoredState::is_consumed);
            if consumed || !spent.insert(*reference) {
                return Err(StorageError::double_spend(*reference));
            }
        }

        let mut produced = HashSet::new();
        for output in &tx.produced {
            let reference = output.reference;
            if self.by_ref.contains_key(&reference) || !produced.insert(reference) {
                return Err(StorageError::duplicate_state(reference));
            }
            if !schemas.types().is_concrete(&output.state.contract_type) {
                return Err(StorageError::unknown_type(
                    &output.state.contract_type,
                    reference,
                ));
            }
        }
        Ok(())
    }
}

/// The vault's record store
#[derive(Debug)]
pub struct VaultStore {
    state: RwLock<VaultState>,
    schemas: Arc<SchemaRegistry>,
    publisher: UpdatePublisher,
    metrics: Arc<MetricsRegistry>,
    open: AtomicBool,
}

impl VaultStore {
    pub fn new(
        schemas: Arc<SchemaRegistry>,
        publisher: UpdatePublisher,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            state: RwLock::new(VaultState::default()),
            schemas,
            publisher,
            metrics,
            open: AtomicBool::new(true),
        }
    }

    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    pub fn publisher(&self) -> &UpdatePublisher {
        &self.publisher
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Stops serving reads and writes. Existing snapshots stay valid.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StorageError::unavailable("vault store is closed"))
        }
    }

    /// Applies a transaction atomically and publishes its update.
    ///
    /// Either every consumed state is marked consumed and every output is
    /// recorded, or the transaction is rejected and nothing is published.
    pub fn record(&self, tx: VaultTransaction) -> StorageResult<Update> {
        self.ensure_open()?;
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::unavailable("vault store lock poisoned"))?;

        if let Err(err) = state.validate(&tx, &self.schemas) {
            drop(state);
            self.metrics.increment_commits_rejected();
            Logger::event(
                Event::CommitRejected,
                &[
                    ("code", err.code().code()),
                    ("tx_id", tx.id.to_string().as_str()),
                ],
            );
            return Err(err);
        }

        let commit_id = state.authority.next_commit_id();
        state
            .authority
            .mark_committed(commit_id)
            .map_err(|e| StorageError::unavailable(e.to_string()))?;
        let now = Utc::now();

        let mut consumed: Vec<StateAndRef> = Vec::with_capacity(tx.consumed.len());
        for reference in &tx.consumed {
            let Some(position) = state.by_ref.get(reference).copied() else {
                continue;
            };
            if let Some(row) = state.states.get_mut(position) {
                row.consume(commit_id, now);
                consumed.push(row.state_and_ref.clone());
            }
        }

        for output in &tx.produced {
            let position = state.states.len();
            state
                .states
                .push(StoredState::recorded(output.clone(), commit_id, now, position as u64));
            state.by_ref.insert(output.reference, position);
            state
                .by_type
                .entry(output.state.contract_type.clone())
                .or_default()
                .push(position);
        }

        let update = Update::new(commit_id, consumed, tx.produced, now);
        let published = self.publisher.publish(&update);
        drop(state);

        published.log();
        self.metrics.increment_commits();
        Logger::event(
            Event::Commit,
            &[
                ("commit_id", commit_id.value().to_string().as_str()),
                ("consumed", update.consumed.len().to_string().as_str()),
                ("produced", update.produced.len().to_string().as_str()),
                ("tx_id", tx.id.to_string().as_str()),
            ],
        );
        Ok(update)
    }

    /// A consistent read view of the store, held until dropped.
    ///
    /// Commits wait while a snapshot is alive; keep it short.
    pub fn snapshot(&self) -> StorageResult<VaultSnapshot<'_>> {
        self.ensure_open()?;
        let guard = self
            .state
            .read()
            .map_err(|_| StorageError::unavailable("vault store lock poisoned"))?;
        Ok(VaultSnapshot { guard })
    }

    /// Copy of one state and its metadata.
    pub fn get(&self, reference: &StateRef) -> StorageResult<Option<StoredState>> {
        Ok(self.snapshot()?.get(reference).cloned())
    }
}

/// A point-in-time view of the store
#[derive(Debug)]
pub struct VaultSnapshot<'a> {
    guard: RwLockReadGuard<'a, VaultState>,
}

impl VaultSnapshot<'_> {
    /// The commit this snapshot reflects; every later commit is invisible.
    pub fn read_view(&self) -> ReadView {
        self.guard.authority.current_snapshot()
    }

    pub fn get(&self, reference: &StateRef) -> Option<&StoredState> {
        self.guard
            .by_ref
            .get(reference)
            .and_then(|position| self.guard.states.get(*position))
    }

    /// Number of states ever recorded, consumed included.
    pub fn len(&self) -> usize {
        self.guard.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.states.is_empty()
    }
}

impl StateSource for VaultSnapshot<'_> {
    fn scan(
        &self,
        types: &BTreeSet<RecordType>,
        status: StateStatus,
    ) -> ExecutorResult<Vec<&StoredState>> {
        let mut positions: Vec<usize> = types
            .iter()
            .filter_map(|t| self.guard.by_type.get(t))
            .flatten()
            .copied()
            .collect();
        positions.sort_unstable();
        positions.dedup();

        Ok(positions
            .into_iter()
            .filter_map(|position| self.guard.states.get(position))
            .filter(|row| status.admits(row.status()))
            .collect())
    }
}
