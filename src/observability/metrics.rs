//! Metrics registry
//!
//! - Monotonic counters plus one gauge (active subscribers)
//! - Reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing the vault's operational counters
///
/// Counters use Relaxed ordering; they are read for reporting only.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    queries_executed: AtomicU64,
    queries_rejected: AtomicU64,
    tracks_started: AtomicU64,
    commits: AtomicU64,
    commits_rejected: AtomicU64,
    updates_published: AtomicU64,
    subscriptions_opened: AtomicU64,
    subscriptions_closed: AtomicU64,
    /// Currently registered subscribers
    active_subscribers: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Query metrics

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tracks_started(&self) {
        self.tracks_started.fetch_add(1, Ordering::Relaxed);
    }

    // Store metrics

    pub fn increment_commits(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_commits_rejected(&self) {
        self.commits_rejected.fetch_add(1, Ordering::Relaxed);
    }

    // Feed metrics

    pub fn add_updates_published(&self, deliveries: u64) {
        self.updates_published.fetch_add(deliveries, Ordering::Relaxed);
    }

    pub fn subscription_opened(&self) {
        self.subscriptions_opened.fetch_add(1, Ordering::Relaxed);
        self.active_subscribers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn subscription_closed(&self) {
        self.subscriptions_closed.fetch_add(1, Ordering::Relaxed);
        // Saturating: a gauge never wraps below zero
        let _ = self
            .active_subscribers
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            tracks_started: self.tracks_started.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            commits_rejected: self.commits_rejected.load(Ordering::Relaxed),
            updates_published: self.updates_published.load(Ordering::Relaxed),
            subscriptions_opened: self.subscriptions_opened.load(Ordering::Relaxed),
            subscriptions_closed: self.subscriptions_closed.load(Ordering::Relaxed),
            active_subscribers: self.active_subscribers.load(Ordering::Relaxed),
        }
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub tracks_started: u64,
    pub commits: u64,
    pub commits_rejected: u64,
    /// Update deliveries, one per subscriber per update
    pub updates_published: u64,
    pub subscriptions_opened: u64,
    pub subscriptions_closed: u64,
    pub active_subscribers: u64,
}
