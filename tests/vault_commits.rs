//! Vault Commit Tests
//!
//! Commit identity and atomicity as seen through the store:
//! - Every commit gets the next commit id
//! - Snapshots name the commit they reflect
//! - Rejected transactions change nothing and publish nothing

mod common;

use common::*;
use vaultdb::contract::{ContractState, RecordType, StateRef, StateStatus, TxId};
use vaultdb::criteria::QueryCriteria;
use vaultdb::mvcc::CommitId;
use vaultdb::realtime::UpdateFilter;
use vaultdb::storage::{StorageErrorCode, VaultTransaction};
use vaultdb::VaultQuery;

// =============================================================================
// Commit Ordering Tests
// =============================================================================

/// Commits are strictly monotonic.
#[test]
fn test_commits_strictly_monotonic() {
    let service = service();

    for i in 1..=10 {
        let update = service
            .store()
            .record(VaultTransaction::new().producing(cash_state(i, "USD")))
            .unwrap();
        assert_eq!(update.commit_id, CommitId::new(i as u64));
    }
}

/// An empty store's snapshot is commit zero.
#[test]
fn test_snapshot_at_zero() {
    let service = service();
    let tracked = service.track_by(&VaultQuery::new(cash_type())).unwrap();
    assert_eq!(tracked.snapshot.upper_bound(), CommitId::new(0));
    assert!(tracked.current.is_empty());
}

/// Snapshot reflects the highest commit and sees everything up to it.
#[test]
fn test_snapshot_reflects_highest() {
    let service = service();
    fund(&service);

    let snapshot = service.store().snapshot().unwrap();
    let view = snapshot.read_view();
    assert_eq!(view.upper_bound(), CommitId::new(5));
    assert!(view.sees(CommitId::new(5)));
    assert!(!view.sees(CommitId::new(6)));
}

/// Recorded metadata names the commits that created and consumed a state.
#[test]
fn test_metadata_commits() {
    let service = service();
    let issued = deposit(&service, "USD", &[50]);
    spend(&service, &issued, 50, "USD");

    let stored = service.store().get(&issued[0]).unwrap().unwrap();
    assert_eq!(stored.metadata.recorded_commit, CommitId::new(1));
    assert_eq!(stored.metadata.consumed_commit, Some(CommitId::new(2)));
    assert_eq!(stored.metadata.status, StateStatus::Consumed);
    assert!(stored.metadata.consumed_time >= Some(stored.metadata.recorded_time));
}

// =============================================================================
// Atomicity Tests
// =============================================================================

/// A double spend in the middle of a transaction rolls back all of it.
#[test]
fn test_rejected_transaction_is_atomic() {
    let service = service();
    let issued = deposit(&service, "USD", &[10, 20]);
    spend(&service, &issued[1..], 20, "USD");

    let mut feed = service.store().publisher().subscribe(UpdateFilter::all()).unwrap();
    let err = service
        .store()
        .record(
            VaultTransaction::new()
                .consuming(issued[0])
                .consuming(issued[1])
                .producing(cash_state(30, "USD")),
        )
        .unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::VaultDoubleSpend);
    assert_eq!(err.reference(), Some(&issued[1]));
    assert!(feed.try_recv().is_none());

    let unconsumed = service.query_by(&VaultQuery::new(cash_type())).unwrap();
    assert_eq!(unconsumed.total_states_available, 2);
    let first = service.store().get(&issued[0]).unwrap().unwrap();
    assert_eq!(first.metadata.status, StateStatus::Unconsumed);

    let next = service
        .store()
        .record(VaultTransaction::new().consuming(issued[0]))
        .unwrap();
    assert_eq!(next.commit_id, CommitId::new(3));
}

#[test]
fn test_store_validation() {
    let service = service();

    let err = service
        .store()
        .record(VaultTransaction::new().consuming(StateRef::new(TxId::of(b"ghost"), 0)))
        .unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::VaultUnknownState);

    let err = service
        .store()
        .record(VaultTransaction::new().producing(ContractState::new(RecordType::linear_state())))
        .unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::VaultUnknownType);

    let tx = VaultTransaction::with_id(TxId::of(b"issue-1")).producing(cash_state(1, "USD"));
    service.store().record(tx.clone()).unwrap();
    let err = service.store().record(tx).unwrap_err();
    assert_eq!(err.code(), StorageErrorCode::VaultDuplicateState);

    let metrics = service.metrics().snapshot();
    assert_eq!(metrics.commits, 1);
    assert_eq!(metrics.commits_rejected, 3);
}

/// Consumed states appear under CONSUMED once their commit lands.
#[test]
fn test_consumed_visible_after_commit() {
    let service = service();
    let issued = deposit(&service, "CHF", &[7, 8]);
    spend(&service, &issued, 15, "CHF");

    let consumed = service
        .query_by(
            &VaultQuery::new(cash_type()).with_criteria(QueryCriteria::status(StateStatus::Consumed)),
        )
        .unwrap();
    assert_eq!(consumed.len(), 2);
    assert!(consumed
        .states_metadata
        .iter()
        .all(|m| m.consumed_commit == Some(CommitId::new(2))));
}
