//! # Update Publisher
//!
//! Fans each commit's `Update` out to every registered subscriber.
//!
//! The store calls `publish` inside its commit critical section, so updates
//! reach every subscriber channel in commit order. Sending never blocks:
//! channels are unbounded and a closed channel simply drops its subscriber.
//! `publish` does no I/O; the caller logs the returned `PublishResult` once
//! its own locks are released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use uuid::Uuid;

use super::errors::{RealtimeError, RealtimeResult};
use super::subscription::{UpdateFilter, UpdateSubscription};
use super::update::Update;
use crate::mvcc::CommitId;
use crate::observability::{Event, Logger, MetricsRegistry};

/// Default cap on concurrently registered subscribers
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 1024;

#[derive(Debug)]
struct Subscriber {
    filter: UpdateFilter,
    sender: mpsc::UnboundedSender<Update>,
}

#[derive(Debug)]
pub(super) struct PublisherInner {
    subscribers: Mutex<HashMap<Uuid, Subscriber>>,
    max_subscribers: usize,
    metrics: Arc<MetricsRegistry>,
}

impl PublisherInner {
    // A panic while holding the map cannot leave it half-updated; keep serving.
    fn subscribers(&self) -> MutexGuard<'_, HashMap<Uuid, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn unsubscribe(&self, id: &Uuid) {
        let (removed, active) = {
            let mut subscribers = self.subscribers();
            (subscribers.remove(id).is_some(), subscribers.len())
        };
        if removed {
            self.metrics.subscription_closed();
            log_closed(id, active);
        }
    }
}

fn log_closed(id: &Uuid, active: usize) {
    Logger::event(
        Event::SubscriptionClosed,
        &[
            ("subscription_id", id.to_string().as_str()),
            ("active", active.to_string().as_str()),
        ],
    );
}

/// Multicast publisher of vault updates
#[derive(Debug, Clone)]
pub struct UpdatePublisher {
    inner: Arc<PublisherInner>,
}

impl UpdatePublisher {
    pub fn new(max_subscribers: usize, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                subscribers: Mutex::new(HashMap::new()),
                max_subscribers,
                metrics,
            }),
        }
    }

    /// Registers a subscriber that receives every update published from now on.
    pub fn subscribe(&self, filter: UpdateFilter) -> RealtimeResult<UpdateSubscription> {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::unbounded_channel();

        let active = {
            let mut subscribers = self
                .inner
                .subscribers
                .lock()
                .map_err(|_| RealtimeError::Internal("subscriber registry poisoned".into()))?;
            if subscribers.len() >= self.inner.max_subscribers {
                return Err(RealtimeError::TooManySubscriptions(
                    self.inner.max_subscribers,
                ));
            }
            subscribers.insert(id, Subscriber { filter, sender });
            subscribers.len()
        };

        self.inner.metrics.subscription_opened();
        Logger::event(
            Event::SubscriptionOpened,
            &[
                ("subscription_id", id.to_string().as_str()),
                ("active", active.to_string().as_str()),
            ],
        );

        Ok(UpdateSubscription::new(
            id,
            receiver,
            Arc::downgrade(&self.inner),
        ))
    }

    /// Delivers `update` to every subscriber whose filter keeps some of it.
    pub fn publish(&self, update: &Update) -> PublishResult {
        let mut result = PublishResult {
            commit_id: Some(update.commit_id),
            ..PublishResult::default()
        };

        let mut subscribers = self.inner.subscribers();
        for (id, subscriber) in subscribers.iter() {
            let Some(view) = subscriber.filter.apply(update) else {
                result.filtered += 1;
                continue;
            };
            match subscriber.sender.send(view) {
                Ok(()) => result.delivered += 1,
                Err(_) => result.dropped.push(*id),
            }
        }
        for id in &result.dropped {
            subscribers.remove(id);
        }
        result.active = subscribers.len();
        drop(subscribers);

        for _ in &result.dropped {
            self.inner.metrics.subscription_closed();
        }
        self.inner
            .metrics
            .add_updates_published(result.delivered as u64);
        result
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }

    pub fn max_subscribers(&self) -> usize {
        self.inner.max_subscribers
    }
}

impl Default for UpdatePublisher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUBSCRIBERS, Arc::new(MetricsRegistry::new()))
    }
}

/// Outcome of one publish
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishResult {
    /// Commit the update belongs to
    pub commit_id: Option<CommitId>,
    /// Subscribers that received the update
    pub delivered: usize,
    /// Subscribers whose filter kept nothing
    pub filtered: usize,
    /// Subscribers found closed and removed
    pub dropped: Vec<Uuid>,
    /// Subscribers still registered afterwards
    pub active: usize,
}

impl PublishResult {
    /// Emits the publish and any subscriber removals to the log.
    pub fn log(&self) {
        for id in &self.dropped {
            log_closed(id, self.active);
        }
        let commit_id = self
            .commit_id
            .map(|c| c.value().to_string())
            .unwrap_or_default();
        Logger::event(
            Event::UpdatePublished,
            &[
                ("commit_id", commit_id.as_str()),
                ("delivered", self.delivered.to_string().as_str()),
                ("filtered", self.filtered.to_string().as_str()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractState, RecordType, StateAndRef, StateRef, TxId};
    use chrono::Utc;

    fn update(commit: u64, contract_type: &str) -> Update {
        Update::new(
            CommitId::new(commit),
            Vec::new(),
            vec![StateAndRef::new(
                ContractState::new(RecordType::new(contract_type)),
                StateRef::new(TxId::of(&commit.to_le_bytes()), 0),
            )],
            Utc::now(),
        )
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let metrics = Arc::new(MetricsRegistry::new());
        let publisher = UpdatePublisher::new(4, Arc::clone(&metrics));

        let subscription = publisher.subscribe(UpdateFilter::all()).unwrap();
        assert_eq!(publisher.subscriber_count(), 1);
        assert_eq!(metrics.snapshot().active_subscribers, 1);

        subscription.close();
        assert_eq!(publisher.subscriber_count(), 0);
        assert_eq!(metrics.snapshot().active_subscribers, 0);
        assert_eq!(metrics.snapshot().subscriptions_closed, 1);
    }

    #[test]
    fn test_subscriber_limit() {
        let publisher = UpdatePublisher::new(1, Arc::new(MetricsRegistry::new()));
        let _first = publisher.subscribe(UpdateFilter::all()).unwrap();
        let err = publisher.subscribe(UpdateFilter::all()).unwrap_err();
        assert_eq!(err, RealtimeError::TooManySubscriptions(1));
    }

    #[tokio::test]
    async fn test_publish_in_order() {
        let publisher = UpdatePublisher::default();
        let mut subscription = publisher.subscribe(UpdateFilter::all()).unwrap();

        for commit in 1..=3 {
            let result = publisher.publish(&update(commit, "Cash"));
            assert_eq!(result.delivered, 1);
        }

        for commit in 1..=3 {
            let received = subscription.recv().await.unwrap();
            assert_eq!(received.commit_id, CommitId::new(commit));
        }
        assert!(subscription.try_recv().is_none());
    }

    #[test]
    fn test_publish_respects_filter() {
        let publisher = UpdatePublisher::default();
        let mut deals = publisher
            .subscribe(UpdateFilter::for_types(
                [RecordType::new("Deal")].into_iter().collect(),
            ))
            .unwrap();

        let result = publisher.publish(&update(1, "Cash"));
        assert_eq!(result.filtered, 1);
        assert_eq!(result.delivered, 0);

        publisher.publish(&update(2, "Deal"));
        let received = deals.drain();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].commit_id, CommitId::new(2));
    }

    #[test]
    fn test_nothing_delivered_after_close() {
        let publisher = UpdatePublisher::default();
        let subscription = publisher.subscribe(UpdateFilter::all()).unwrap();
        drop(subscription);

        let result = publisher.publish(&update(1, "Cash"));
        assert_eq!(result.delivered, 0);
        assert!(result.dropped.is_empty());
        assert_eq!(result.active, 0);
    }

    #[test]
    fn test_closed_channel_removed_and_reported() {
        let metrics = Arc::new(MetricsRegistry::new());
        let publisher = UpdatePublisher::new(4, Arc::clone(&metrics));
        let _live = publisher.subscribe(UpdateFilter::all()).unwrap();

        let stale = Uuid::new_v4();
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        publisher.inner.subscribers().insert(
            stale,
            Subscriber {
                filter: UpdateFilter::all(),
                sender,
            },
        );
        metrics.subscription_opened();

        let result = publisher.publish(&update(7, "Cash"));
        assert_eq!(result.commit_id, Some(CommitId::new(7)));
        assert_eq!(result.delivered, 1);
        assert_eq!(result.dropped, vec![stale]);
        assert_eq!(result.active, 1);
        assert_eq!(publisher.subscriber_count(), 1);
        assert_eq!(metrics.snapshot().subscriptions_closed, 1);
        assert_eq!(metrics.snapshot().updates_published, 1);

        // Reporting happens separately from delivery.
        result.log();
    }
}
