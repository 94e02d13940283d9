//! Time-windowed deduplication of error notifications.
//!
//! The cache remembers when each error signature was last seen. A sighting
//! notifies when the signature is new or has been quiet for longer than the
//! window; otherwise it is suppressed. Every sighting refreshes the
//! timestamp, so a steady stream of one error stays suppressed for as long as
//! the gaps between occurrences stay within the window.
//!
//! The decision only governs the notification side channel. Records are
//! always forwarded to the backend.

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, EvictionCandidate, EvictionPolicy, Storage};
use crate::domain::signature::ErrorSignature;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default suppression window.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(5);

/// Default upper bound on tracked signatures.
pub const DEFAULT_MAX_SIGNATURES: usize = 10_000;

/// Entries idle for this many windows are swept before any LRU eviction.
pub const STALE_WINDOW_FACTOR: u32 = 12;

/// A full cache evicts `len / EVICTION_HEADROOM_DIVISOR` extra entries, so the
/// next new signatures insert without another scan.
pub const EVICTION_HEADROOM_DIVISOR: usize = 64;

/// Last sighting of one signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupEntry {
    last_seen: Instant,
    sightings: u64,
}

impl DedupEntry {
    fn unseen(now: Instant) -> Self {
        Self {
            last_seen: now,
            sightings: 0,
        }
    }

    /// Record a sighting at `now` and decide whether it should notify.
    fn observe(&mut self, now: Instant, window: Duration) -> bool {
        let notify =
            self.sightings == 0 || now.saturating_duration_since(self.last_seen) > window;
        // Racing callers may arrive with slightly older instants
        self.last_seen = self.last_seen.max(now);
        self.sightings += 1;
        notify
    }

    /// When the signature was last seen.
    pub fn last_seen(&self) -> Instant {
        self.last_seen
    }

    /// How many times the signature has been seen while tracked.
    pub fn sightings(&self) -> u64 {
        self.sightings
    }
}

/// Concurrent map from error signature to last sighting.
///
/// Generic over the storage port; in production use `Arc<ShardedStorage>`.
/// The check-and-update for one signature runs under the storage entry lock,
/// so concurrent first sightings produce exactly one notification.
///
/// With an eviction policy the cache is bounded: once concurrent calls have
/// returned it never holds more entries than the policy allows. Stale sweeps
/// run at most once per window and a full cache evicts a batch of least
/// recently seen entries, so the O(n) scans are amortized over many new
/// signatures.
#[derive(Debug, Clone)]
pub struct DeduplicationCache<S>
where
    S: Storage<ErrorSignature, DedupEntry> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    window: Duration,
    eviction: Option<Arc<dyn EvictionPolicy<ErrorSignature, DedupEntry>>>,
    last_sweep: Arc<Mutex<Option<Instant>>>,
    metrics: Metrics,
}

impl<S> DeduplicationCache<S>
where
    S: Storage<ErrorSignature, DedupEntry> + Clone,
{
    /// Create an unbounded cache.
    pub fn new(storage: S, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            storage,
            clock,
            window,
            eviction: None,
            last_sweep: Arc::new(Mutex::new(None)),
            metrics: Metrics::new(),
        }
    }

    /// Bound the cache with an eviction policy.
    pub fn with_eviction_policy(
        mut self,
        policy: Arc<dyn EvictionPolicy<ErrorSignature, DedupEntry>>,
    ) -> Self {
        self.eviction = Some(policy);
        self
    }

    /// Share a metrics tracker for eviction counts.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Record a sighting at the clock's current instant.
    pub fn check(&self, signature: ErrorSignature) -> bool {
        self.should_notify(signature, self.clock.now())
    }

    /// Record a sighting at `now` and decide whether it should notify.
    ///
    /// Returns `true` when the signature is new or was last seen more than
    /// one window before `now`.
    pub fn should_notify(&self, signature: ErrorSignature, now: Instant) -> bool {
        if let Some(policy) = &self.eviction {
            if !self.storage.contains_key(&signature) && policy.should_evict(self.storage.len()) {
                self.make_room(policy.as_ref(), now);
            }
        }

        let window = self.window;
        let notify = self.storage.with_entry_mut(
            signature,
            || DedupEntry::unseen(now),
            |entry| entry.observe(now, window),
        );

        // Concurrent newcomers may all have passed the capacity check above
        if let Some(policy) = &self.eviction {
            while Self::over_capacity(policy.as_ref(), self.storage.len()) {
                if self.evict(policy.as_ref(), Some(signature), 0) == 0 {
                    break;
                }
            }
        }

        debug!(signature = %signature, notify, "error notification decision");
        notify
    }

    /// Remove every entry idle for longer than the stale threshold.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        self.mark_swept(now);

        let stale_after = self.stale_after();
        let mut removed = 0;
        self.storage.retain(|_, entry| {
            let keep = now.saturating_duration_since(entry.last_seen) <= stale_after;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            self.metrics.record_evictions(removed as u64);
            debug!(removed, "swept stale error signatures");
        }
        removed
    }

    /// Remove stale entries as of the clock's current instant.
    pub fn purge_stale(&self) -> usize {
        self.purge_expired(self.clock.now())
    }

    fn mark_swept(&self, now: Instant) {
        let mut last = self
            .last_sweep
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = Some(last.map_or(now, |prev| prev.max(now)));
    }

    fn sweep_due(&self, now: Instant) -> bool {
        let last = self
            .last_sweep
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        last.map_or(true, |prev| now.saturating_duration_since(prev) > self.window)
    }

    fn over_capacity(
        policy: &dyn EvictionPolicy<ErrorSignature, DedupEntry>,
        len: usize,
    ) -> bool {
        len > 0 && policy.should_evict(len - 1)
    }

    fn make_room(&self, policy: &dyn EvictionPolicy<ErrorSignature, DedupEntry>, now: Instant) {
        if self.sweep_due(now) {
            self.purge_expired(now);
        }
        if policy.should_evict(self.storage.len()) {
            let headroom = self.storage.len() / EVICTION_HEADROOM_DIVISOR;
            self.evict(policy, None, headroom);
        }
    }

    /// Evict least recently seen entries until the policy is satisfied, then
    /// `headroom` more. `keep` is never evicted.
    ///
    /// Returns how many victims were selected; racing callers may already
    /// have removed some of them.
    fn evict(
        &self,
        policy: &dyn EvictionPolicy<ErrorSignature, DedupEntry>,
        keep: Option<ErrorSignature>,
        headroom: usize,
    ) -> usize {
        let mut candidates = Vec::with_capacity(self.storage.len());
        self.storage.for_each(|signature, entry| {
            if Some(*signature) != keep {
                candidates.push(EvictionCandidate {
                    key: *signature,
                    value: *entry,
                    last_access: entry.last_seen,
                });
            }
        });

        // A kept newcomer is already counted in `len`
        let len = self.storage.len();
        let target = if keep.is_some() { len.saturating_sub(1) } else { len };
        let needed = (0..=target)
            .rev()
            .take_while(|n| policy.should_evict(*n))
            .count();
        let victims = policy.select_victims(&mut candidates, needed + headroom);
        let selected = victims.len();

        let mut evicted = 0u64;
        for victim in victims {
            if self.storage.remove(&victim) {
                evicted += 1;
                debug!(signature = %victim, "evicted error signature");
            }
        }

        if evicted > 0 {
            self.metrics.record_evictions(evicted);
        }
        selected
    }

    /// Idle time after which an entry is considered stale.
    pub fn stale_after(&self) -> Duration {
        self.window.saturating_mul(STALE_WINDOW_FACTOR)
    }

    /// The suppression window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check whether a signature is currently tracked.
    pub fn contains(&self, signature: ErrorSignature) -> bool {
        self.storage.contains_key(&signature)
    }

    /// Get the number of tracked signatures.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no signature is tracked.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Forget every signature.
    pub fn clear(&self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::eviction::LruEviction;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::sync::Barrier;
    use std::thread;

    type TestCache = DeduplicationCache<Arc<ShardedStorage<ErrorSignature, DedupEntry>>>;

    fn cache(clock: &MockClock) -> TestCache {
        DeduplicationCache::new(
            Arc::new(ShardedStorage::new()),
            Arc::new(clock.clone()),
            DEFAULT_DEDUP_WINDOW,
        )
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_repeat_within_window_is_suppressed() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start));
        let sig = ErrorSignature::new("ValueError", "bad input");

        assert!(cache.should_notify(sig, start));
        assert!(!cache.should_notify(sig, start + secs(3)));
    }

    #[test]
    fn test_repeat_after_window_notifies() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start));
        let sig = ErrorSignature::new("ValueError", "bad input");

        assert!(cache.should_notify(sig, start));
        assert!(cache.should_notify(sig, start + secs(6)));
    }

    #[test]
    fn test_exactly_window_is_still_suppressed() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start));
        let sig = ErrorSignature::new("E", "m");

        assert!(cache.should_notify(sig, start));
        assert!(!cache.should_notify(sig, start + DEFAULT_DEDUP_WINDOW));
    }

    #[test]
    fn test_sliding_window_keeps_suppressing() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start));
        let sig = ErrorSignature::new("TimeoutError", "upstream timed out");

        assert!(cache.should_notify(sig, start));
        for step in 1..=10 {
            assert!(
                !cache.should_notify(sig, start + secs(4 * step)),
                "sighting at {}s should be suppressed",
                4 * step
            );
        }
        assert!(cache.should_notify(sig, start + secs(40 + 6)));
    }

    #[test]
    fn test_signatures_are_independent() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start));
        let a = ErrorSignature::new("E", "a");
        let b = ErrorSignature::new("E", "b");

        assert!(cache.should_notify(a, start));
        assert!(cache.should_notify(b, start));
        assert!(!cache.should_notify(a, start + secs(1)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_check_uses_clock() {
        let start = Instant::now();
        let clock = MockClock::new(start);
        let cache = cache(&clock);
        let sig = ErrorSignature::new("E", "m");

        assert!(cache.check(sig));
        clock.advance(secs(2));
        assert!(!cache.check(sig));
        clock.advance(secs(10));
        assert!(cache.check(sig));
    }

    #[test]
    fn test_purge_expired() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start));
        let old = ErrorSignature::new("E", "old");
        let fresh = ErrorSignature::new("E", "fresh");

        cache.should_notify(old, start);
        cache.should_notify(fresh, start + secs(60));

        let removed = cache.purge_expired(start + secs(61));

        assert_eq!(removed, 1);
        assert!(!cache.contains(old));
        assert!(cache.contains(fresh));
    }

    #[test]
    fn test_bounded_cache_evicts_least_recent() {
        let start = Instant::now();
        let metrics = Metrics::new();
        let cache = cache(&MockClock::new(start))
            .with_eviction_policy(Arc::new(LruEviction::new(3)))
            .with_metrics(metrics.clone());

        let sigs: Vec<_> = (0..3)
            .map(|i| ErrorSignature::new("E", &format!("msg {}", i)))
            .collect();
        for (i, sig) in sigs.iter().enumerate() {
            cache.should_notify(*sig, start + secs(i as u64));
        }
        // Touch the first one so the second becomes least recent
        cache.should_notify(sigs[0], start + secs(3));

        let newcomer = ErrorSignature::new("E", "msg 3");
        assert!(cache.should_notify(newcomer, start + secs(4)));

        assert_eq!(cache.len(), 3);
        assert!(cache.contains(sigs[0]));
        assert!(!cache.contains(sigs[1]));
        assert!(cache.contains(sigs[2]));
        assert_eq!(metrics.signatures_evicted(), 1);
    }

    #[test]
    fn test_bounded_cache_prefers_stale_sweep() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start)).with_eviction_policy(Arc::new(LruEviction::new(2)));
        let stale = ErrorSignature::new("E", "stale");
        let recent = ErrorSignature::new("E", "recent");
        let newcomer = ErrorSignature::new("E", "new");

        cache.should_notify(stale, start);
        cache.should_notify(recent, start + secs(100));
        cache.should_notify(newcomer, start + secs(101));

        assert!(!cache.contains(stale));
        assert!(cache.contains(recent));
        assert!(cache.contains(newcomer));
    }

    #[test]
    fn test_overfilled_storage_is_trimmed_after_insert() {
        let start = Instant::now();
        let storage = Arc::new(ShardedStorage::new());
        let cache = DeduplicationCache::new(
            Arc::clone(&storage),
            Arc::new(MockClock::new(start)),
            DEFAULT_DEDUP_WINDOW,
        )
        .with_eviction_policy(Arc::new(LruEviction::new(3)));

        // Six entries behind the cache's back, as racing inserts would leave
        let sigs: Vec<_> = (0..6)
            .map(|i| ErrorSignature::new("E", &format!("msg {}", i)))
            .collect();
        for (i, sig) in sigs.iter().enumerate() {
            storage.insert(*sig, DedupEntry::unseen(start + secs(i as u64)));
        }

        cache.should_notify(sigs[0], start + secs(10));

        assert_eq!(cache.len(), 3);
        assert!(cache.contains(sigs[0]));
        assert!(cache.contains(sigs[4]));
        assert!(cache.contains(sigs[5]));
    }

    #[test]
    fn test_concurrent_newcomers_at_capacity_respect_bound() {
        let start = Instant::now();
        let max = 4;
        let cache = Arc::new(
            cache(&MockClock::new(start)).with_eviction_policy(Arc::new(LruEviction::new(max))),
        );
        for i in 0..max {
            cache.should_notify(ErrorSignature::new("Seed", &i.to_string()), start);
        }
        assert_eq!(cache.len(), max);

        let threads = 32;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    for round in 0..20 {
                        let sig = ErrorSignature::new("Worker", &format!("{} {}", t, round));
                        assert!(cache.should_notify(sig, start + secs(1)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= max, "cache holds {} entries", cache.len());
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_full_cache_evicts_headroom_batch() {
        let start = Instant::now();
        let max = 128;
        let metrics = Metrics::new();
        let cache = cache(&MockClock::new(start))
            .with_eviction_policy(Arc::new(LruEviction::new(max)))
            .with_metrics(metrics.clone());
        for i in 0..max {
            let at = start + Duration::from_millis(i as u64);
            cache.should_notify(ErrorSignature::new("E", &i.to_string()), at);
        }

        cache.should_notify(ErrorSignature::new("E", "newcomer"), start + secs(1));

        // One slot for the newcomer plus max / 64 spare
        assert_eq!(metrics.signatures_evicted(), 3);
        assert_eq!(cache.len(), max - 2);
        assert!(!cache.contains(ErrorSignature::new("E", "0")));
        assert!(!cache.contains(ErrorSignature::new("E", "2")));
        assert!(cache.contains(ErrorSignature::new("E", "3")));

        // The spare slots absorb the next newcomers without a scan
        cache.should_notify(ErrorSignature::new("E", "second"), start + secs(2));
        cache.should_notify(ErrorSignature::new("E", "third"), start + secs(3));
        assert_eq!(metrics.signatures_evicted(), 3);
        assert_eq!(cache.len(), max);
    }

    #[test]
    fn test_stale_sweep_runs_at_most_once_per_window() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start)).with_eviction_policy(Arc::new(LruEviction::new(4)));
        let sig = |m: &str| ErrorSignature::new("E", m);

        cache.should_notify(sig("x"), start);
        cache.should_notify(sig("y1"), start + secs(3));
        cache.should_notify(sig("y2"), start + secs(4));
        cache.should_notify(sig("q"), start + secs(50));

        // Sweep at 62s: only x is older than 60s
        cache.should_notify(sig("z"), start + secs(62));
        assert!(!cache.contains(sig("x")));
        assert!(cache.contains(sig("y1")));
        assert_eq!(cache.len(), 4);

        // y1 and y2 are stale now, but the last sweep is under a window old
        cache.should_notify(sig("w"), start + secs(65));
        assert!(!cache.contains(sig("y1")));
        assert!(cache.contains(sig("y2")));
        assert_eq!(cache.len(), 4);

        cache.should_notify(sig("v"), start + secs(68));
        assert!(!cache.contains(sig("y2")));
        assert!(cache.contains(sig("v")));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_known_signature_never_triggers_eviction() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start)).with_eviction_policy(Arc::new(LruEviction::new(2)));
        let a = ErrorSignature::new("E", "a");
        let b = ErrorSignature::new("E", "b");

        cache.should_notify(a, start);
        cache.should_notify(b, start);
        cache.should_notify(a, start + secs(1));

        assert!(cache.contains(a));
        assert!(cache.contains(b));
    }

    #[test]
    fn test_concurrent_first_sightings_notify_once() {
        let start = Instant::now();
        let cache = Arc::new(cache(&MockClock::new(start)));
        let sig = ErrorSignature::new("ConnectionError", "database unreachable");
        let threads = 16;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.should_notify(sig, start)
                })
            })
            .collect();

        let notified = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|notify| *notify)
            .count();

        assert_eq!(notified, 1);
    }

    #[test]
    fn test_clear() {
        let start = Instant::now();
        let cache = cache(&MockClock::new(start));
        let sig = ErrorSignature::new("E", "m");

        cache.should_notify(sig, start);
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.should_notify(sig, start + secs(1)));
    }
}
