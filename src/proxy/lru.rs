//! LRU Tracker Module
//!
//! Tracks key access order so a bounded proxy can drop its coldest key.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct LruTracker<K> {
    order: VecDeque<K>,
}

impl<K> Default for LruTracker<K> {
    fn default() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl<K: PartialEq + Clone> LruTracker<K> {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front).
    pub fn touch(&mut self, key: &K) {
        self.remove(key);
        self.order.push_front(key.clone());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    #[allow(dead_code)]
    pub fn evict_oldest(&mut self) -> Option<K> {
        self.order.pop_back()
    }

    // == Evict Oldest Where ==
    /// Returns and removes the least recently used key accepted by `eligible`.
    ///
    /// Rejected keys keep their position. Returns None if no key qualifies.
    pub fn evict_oldest_where<F>(&mut self, mut eligible: F) -> Option<K>
    where
        F: FnMut(&K) -> bool,
    {
        let index = self.order.iter().rposition(|k| eligible(k))?;
        self.order.remove(index)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.back()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_new() {
        let lru: LruTracker<u32> = LruTracker::new();
        assert!(lru.is_empty());
        assert_eq!(lru.len(), 0);
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruTracker::new();

        lru.touch(&1);
        lru.touch(&2);
        lru.touch(&3);

        // Touch 1 again - should move to front
        lru.touch(&1);

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.peek_oldest(), Some(&2));
    }

    #[test]
    fn test_lru_evict_oldest() {
        let mut lru = LruTracker::new();

        lru.touch(&"a".to_string());
        lru.touch(&"b".to_string());

        assert_eq!(lru.evict_oldest(), Some("a".to_string()));
        assert_eq!(lru.evict_oldest(), Some("b".to_string()));
        assert_eq!(lru.evict_oldest(), None);
    }

    #[test]
    fn test_lru_remove() {
        let mut lru = LruTracker::new();

        lru.touch(&(1, "USD"));
        lru.touch(&(2, "EUR"));
        lru.remove(&(1, "USD"));
        lru.remove(&(9, "GBP"));

        assert_eq!(lru.len(), 1);
        assert_eq!(lru.peek_oldest(), Some(&(2, "EUR")));
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = LruTracker::new();

        // [c, b, a] -> touch a, c, b -> [b, c, a]
        for key in ['a', 'b', 'c', 'a', 'c', 'b'] {
            lru.touch(&key);
        }

        assert_eq!(lru.evict_oldest(), Some('a'));
        assert_eq!(lru.evict_oldest(), Some('c'));
        assert_eq!(lru.evict_oldest(), Some('b'));
    }

    #[test]
    fn test_lru_evict_oldest_where_skips_ineligible() {
        let mut lru = LruTracker::new();

        // Back to front: 1, 2, 3
        lru.touch(&1);
        lru.touch(&2);
        lru.touch(&3);

        assert_eq!(lru.evict_oldest_where(|k| *k != 1), Some(2));
        assert_eq!(lru.len(), 2);
        // 1 kept its place as the oldest key
        assert_eq!(lru.peek_oldest(), Some(&1));
        assert_eq!(lru.evict_oldest_where(|k| *k > 5), None);
        assert_eq!(lru.len(), 2);
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = LruTracker::new();

        lru.touch(&());
        lru.touch(&());

        assert_eq!(lru.len(), 1);
    }
}
