//! Observability metrics for the logging client.
//!
//! Provides counters about forwarding and notification behavior for
//! monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking dispatcher statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Events the transport accepted
    events_forwarded: AtomicU64,
    /// Events the transport failed to deliver
    events_failed: AtomicU64,
    /// Error events that were cleared to notify
    notifications_allowed: AtomicU64,
    /// Error events whose notification was suppressed as duplicate
    notifications_suppressed: AtomicU64,
    /// Signatures removed from the deduplication cache
    signatures_evicted: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_forwarded(&self) {
        self.inner.events_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.inner.events_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_notification(&self, allowed: bool) {
        let counter = if allowed {
            &self.inner.notifications_allowed
        } else {
            &self.inner.notifications_suppressed
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: u64) {
        self.inner
            .signatures_evicted
            .fetch_add(count, Ordering::Relaxed);
    }

    /// Get the number of events delivered.
    pub fn events_forwarded(&self) -> u64 {
        self.inner.events_forwarded.load(Ordering::Relaxed)
    }

    /// Get the number of events that failed to deliver.
    pub fn events_failed(&self) -> u64 {
        self.inner.events_failed.load(Ordering::Relaxed)
    }

    /// Get the number of error events cleared to notify.
    pub fn notifications_allowed(&self) -> u64 {
        self.inner.notifications_allowed.load(Ordering::Relaxed)
    }

    /// Get the number of suppressed notifications.
    pub fn notifications_suppressed(&self) -> u64 {
        self.inner.notifications_suppressed.load(Ordering::Relaxed)
    }

    /// Get the number of evicted signatures.
    pub fn signatures_evicted(&self) -> u64 {
        self.inner.signatures_evicted.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_forwarded: self.events_forwarded(),
            events_failed: self.events_failed(),
            notifications_allowed: self.notifications_allowed(),
            notifications_suppressed: self.notifications_suppressed(),
            signatures_evicted: self.signatures_evicted(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.inner.events_forwarded.store(0, Ordering::Relaxed);
        self.inner.events_failed.store(0, Ordering::Relaxed);
        self.inner.notifications_allowed.store(0, Ordering::Relaxed);
        self.inner.notifications_suppressed.store(0, Ordering::Relaxed);
        self.inner.signatures_evicted.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Events the transport accepted
    pub events_forwarded: u64,
    /// Events the transport failed to deliver
    pub events_failed: u64,
    /// Error events cleared to notify
    pub notifications_allowed: u64,
    /// Suppressed notifications
    pub notifications_suppressed: u64,
    /// Signatures evicted from the cache
    pub signatures_evicted: u64,
}

impl MetricsSnapshot {
    /// Total events handed to the transport.
    pub fn total_events(&self) -> u64 {
        self.events_forwarded.saturating_add(self.events_failed)
    }

    /// Ratio of suppressed to total notification decisions (0.0 to 1.0).
    pub fn suppression_rate(&self) -> f64 {
        let total = self
            .notifications_allowed
            .saturating_add(self.notifications_suppressed);
        if total == 0 {
            0.0
        } else {
            self.notifications_suppressed as f64 / total as f64
        }
    }
}
