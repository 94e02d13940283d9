//! LRU (Least Recently Used) eviction adapter.

use crate::application::ports::{EvictionCandidate, EvictionPolicy};

/// LRU eviction policy with entry count limit.
///
/// Evicts the entry whose last sighting is oldest once the limit is reached.
#[derive(Debug, Clone)]
pub struct LruEviction {
    /// Maximum number of entries before eviction
    max_entries: usize,
}

impl LruEviction {
    /// Create a new LRU eviction policy with the given entry limit.
    pub fn new(max_entries: usize) -> Self {
        Self { max_entries }
    }

    /// The configured entry limit.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl<K, V> EvictionPolicy<K, V> for LruEviction
where
    K: Clone,
    V: Clone,
{
    fn select_victim(&self, candidates: &[EvictionCandidate<K, V>]) -> Option<K> {
        candidates
            .iter()
            .min_by_key(|candidate| candidate.last_access)
            .map(|candidate| candidate.key.clone())
    }

    fn select_victims(&self, candidates: &mut Vec<EvictionCandidate<K, V>>, count: usize) -> Vec<K>
    where
        K: PartialEq,
    {
        let count = count.min(candidates.len());
        if count == 0 {
            return Vec::new();
        }
        if count < candidates.len() {
            candidates.select_nth_unstable_by_key(count - 1, |candidate| candidate.last_access);
        }
        candidates
            .drain(..count)
            .map(|candidate| candidate.key)
            .collect()
    }

    fn should_evict(&self, current_entries: usize) -> bool {
        current_entries >= self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    // Larger offsets are more recent; adding avoids underflowing `Instant`.
    fn candidate(key: &str, offset_secs: u64, base: Instant) -> EvictionCandidate<String, u32> {
        EvictionCandidate {
            key: key.to_string(),
            value: 0,
            last_access: base + Duration::from_secs(offset_secs),
        }
    }

    #[test]
    fn test_lru_select_oldest() {
        let policy = LruEviction::new(10);
        let base = Instant::now();

        let candidates = vec![
            candidate("key1", 10, base),
            candidate("key2", 0, base),
            candidate("key3", 5, base),
        ];

        assert_eq!(policy.select_victim(&candidates), Some("key2".to_string()));
    }

    #[test]
    fn test_lru_should_evict() {
        let policy = LruEviction::new(100);

        assert!(!<LruEviction as EvictionPolicy<String, u32>>::should_evict(&policy, 99));
        assert!(<LruEviction as EvictionPolicy<String, u32>>::should_evict(&policy, 100));
        assert!(<LruEviction as EvictionPolicy<String, u32>>::should_evict(&policy, 101));
    }

    #[test]
    fn test_lru_select_victims_takes_oldest_batch() {
        let policy = LruEviction::new(10);
        let base = Instant::now();
        let mut candidates = vec![
            candidate("d", 30, base),
            candidate("a", 0, base),
            candidate("c", 20, base),
            candidate("b", 10, base),
        ];

        let mut victims = policy.select_victims(&mut candidates, 2);
        victims.sort();

        assert_eq!(victims, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(candidates.len(), 2);
        assert!(policy.select_victims(&mut candidates, 5).len() == 2);
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_lru_empty_candidates() {
        let policy = LruEviction::new(10);
        let candidates: Vec<EvictionCandidate<String, u32>> = vec![];

        assert_eq!(policy.select_victim(&candidates), None);
    }

    #[test]
    fn test_lru_extreme_time_differences() {
        let policy = LruEviction::new(10);
        let base = Instant::now();

        let candidates = vec![
            candidate("recent", 365 * 24 * 3600, base),
            candidate("ancient", 0, base),
            candidate("middle", 3600, base),
        ];

        assert_eq!(
            policy.select_victim(&candidates),
            Some("ancient".to_string()),
            "Should select the oldest entry even with extreme time differences"
        );
    }
}
