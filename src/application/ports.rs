//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::event::Event;
use crate::error::{NotifyError, TransportError};
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Candidate entry for eviction consideration.
///
/// Values are cloned to avoid holding concurrent map guards while a policy
/// makes its decision.
pub struct EvictionCandidate<K, V> {
    /// The key of the entry
    pub key: K,
    /// The value of the entry (cloned)
    pub value: V,
    /// Last access time for LRU-based strategies
    pub last_access: Instant,
}

/// Port for eviction policy decisions.
///
/// The deduplication cache delegates the choice of which signature to drop
/// when it is full. Infrastructure provides `LruEviction`.
pub trait EvictionPolicy<K, V>: Send + Sync + Debug
where
    K: Clone,
    V: Clone,
{
    /// Select a victim from the given candidates, or None to evict nothing.
    fn select_victim(&self, candidates: &[EvictionCandidate<K, V>]) -> Option<K>;

    /// Select up to `count` victims, removing them from `candidates`.
    ///
    /// The default calls `select_victim` once per victim; policies that can
    /// rank candidates in one pass should override it.
    fn select_victims(&self, candidates: &mut Vec<EvictionCandidate<K, V>>, count: usize) -> Vec<K>
    where
        K: PartialEq,
    {
        let mut victims = Vec::with_capacity(count.min(candidates.len()));
        while victims.len() < count {
            let Some(victim) = self.select_victim(candidates.as_slice()) else {
                break;
            };
            candidates.retain(|candidate| candidate.key != victim);
            victims.push(victim);
        }
        victims
    }

    /// Check if eviction should be triggered for the current entry count.
    fn should_evict(&self, current_entries: usize) -> bool;
}

/// Port for obtaining current time.
///
/// Infrastructure provides `SystemClock`; tests use `MockClock`.
pub trait Clock: Send + Sync + Debug {
    /// Monotonic instant, used for deduplication windows.
    fn now(&self) -> Instant;

    /// Wall-clock time, used for event timestamps.
    fn wall_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Port for concurrent key-value storage.
///
/// Infrastructure provides `ShardedStorage`.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// Creation and the accessor run as one atomic step for the key: two
    /// concurrent callers never both observe a freshly created value.
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Check if a key is present.
    fn contains_key(&self, key: &K) -> bool;

    /// Remove a key, returning whether it was present.
    fn remove(&self, key: &K) -> bool;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Iterate over all entries, providing access to both key and value.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Port for delivering an event to the ingestion backend.
///
/// Implementations make a single attempt and own their timeout policy.
pub trait Transport: Send + Sync + Debug {
    /// Send one event.
    ///
    /// # Errors
    /// Returns a `TransportError` if the event could not be delivered.
    fn send(&self, event: &Event) -> Result<(), TransportError>;
}

/// Port for the notification side channel.
///
/// Called only for error events whose signature was not seen within the
/// deduplication window.
pub trait Notifier: Send + Sync + Debug {
    /// Fire a notification for an error event.
    ///
    /// # Errors
    /// Returns a `NotifyError` if the notification could not be dispatched.
    fn notify(&self, event: &Event) -> Result<(), NotifyError>;
}
