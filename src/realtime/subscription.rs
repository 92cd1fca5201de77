//! # Update Subscriptions
//!
//! The receiving end of the update feed. A subscription owns its channel;
//! dropping or closing it unregisters it from the publisher.

use std::collections::BTreeSet;
use std::sync::Weak;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::publisher::PublisherInner;
use super::update::Update;
use crate::contract::RecordType;

/// Which part of each update a subscriber receives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFilter {
    /// Concrete types to keep; `None` keeps everything
    types: Option<BTreeSet<RecordType>>,
}

impl UpdateFilter {
    /// Every update, unchanged.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only states of `types`. Updates left empty are not delivered.
    pub fn for_types(types: BTreeSet<RecordType>) -> Self {
        Self { types: Some(types) }
    }

    pub fn types(&self) -> Option<&BTreeSet<RecordType>> {
        self.types.as_ref()
    }

    /// What this subscriber should see of `update`, if anything.
    pub fn apply(&self, update: &Update) -> Option<Update> {
        match &self.types {
            None => Some(update.clone()),
            Some(types) => {
                let restricted = update.restrict_to(types);
                (!restricted.is_empty()).then_some(restricted)
            }
        }
    }
}

/// A live feed of updates, delivered in commit order.
///
/// Buffering is unbounded per subscriber: a slow consumer never blocks a
/// commit and never loses or reorders updates.
#[derive(Debug)]
pub struct UpdateSubscription {
    id: Uuid,
    receiver: mpsc::UnboundedReceiver<Update>,
    publisher: Weak<PublisherInner>,
}

impl UpdateSubscription {
    pub(super) fn new(
        id: Uuid,
        receiver: mpsc::UnboundedReceiver<Update>,
        publisher: Weak<PublisherInner>,
    ) -> Self {
        Self {
            id,
            receiver,
            publisher,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Waits for the next update. `None` once the publisher is gone and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<Update> {
        self.receiver.recv().await
    }

    /// Next buffered update, without waiting.
    pub fn try_recv(&mut self) -> Option<Update> {
        self.receiver.try_recv().ok()
    }

    /// Blocking receive for use outside an async runtime.
    pub fn blocking_recv(&mut self) -> Option<Update> {
        self.receiver.blocking_recv()
    }

    /// All currently buffered updates.
    pub fn drain(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// Releases the subscription. Nothing further is delivered.
    pub fn close(self) {}
}

impl Drop for UpdateSubscription {
    fn drop(&mut self) {
        self.receiver.close();
        if let Some(publisher) = self.publisher.upgrade() {
            publisher.unsubscribe(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractState, StateAndRef, StateRef, TxId};
    use crate::mvcc::CommitId;
    use chrono::Utc;

    fn update(contract_type: &str) -> Update {
        Update::new(
            CommitId::new(1),
            Vec::new(),
            vec![StateAndRef::new(
                ContractState::new(RecordType::new(contract_type)),
                StateRef::new(TxId::of(b"tx"), 0),
            )],
            Utc::now(),
        )
    }

    #[test]
    fn test_filter_all_passes_everything() {
        let filter = UpdateFilter::all();
        assert!(filter.types().is_none());
        let cash = update("Cash");
        assert_eq!(filter.apply(&cash), Some(cash.clone()));
    }

    #[test]
    fn test_filter_skips_updates_emptied_by_type_scope() {
        let filter = UpdateFilter::for_types([RecordType::new("Cash")].into_iter().collect());
        assert!(filter.apply(&update("Cash")).is_some());
        assert!(filter.apply(&update("Deal")).is_none());
    }
}
