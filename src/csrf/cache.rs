//! Bounded per-session nonce cache.
//!
//! # Design Decisions
//! - Eviction is by insertion age only; lookups never refresh a token
//! - One mutex guards both the queue and the membership set
//! - Re-adding a token that is still cached is a no-op

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

/// Default number of live tokens per session.
pub const DEFAULT_NONCE_CACHE_SIZE: usize = 5;

/// Upper bound on slots allocated up front; larger caches grow on demand.
const PREALLOCATED_SLOTS: usize = 16;

#[derive(Debug, Default)]
struct Inner {
    order: VecDeque<String>,
    members: HashSet<String>,
}

/// Insertion-ordered set of the most recently issued nonces.
#[derive(Debug)]
pub struct NonceCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl NonceCache {
    /// Create an empty cache. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = capacity.min(PREALLOCATED_SLOTS);
        Self {
            capacity,
            inner: Mutex::new(Inner {
                order: VecDeque::with_capacity(slots),
                members: HashSet::with_capacity(slots),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert `token`, evicting the oldest entry once over capacity.
    pub fn add(&self, token: impl Into<String>) {
        let token = token.into();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !inner.members.insert(token.clone()) {
            return;
        }
        inner.order.push_back(token);
        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.members.remove(&evicted);
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .members
            .contains(token)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live tokens, oldest first.
    pub fn tokens(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .iter()
            .cloned()
            .collect()
    }
}

impl Default for NonceCache {
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_evicts_oldest() {
        let cache = NonceCache::new(3);
        for t in ["a", "b", "c", "d"] {
            cache.add(t);
        }
        assert_eq!(cache.tokens(), vec!["b", "c", "d"]);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn test_contains_does_not_refresh() {
        let cache = NonceCache::new(2);
        cache.add("a");
        cache.add("b");
        assert!(cache.contains("a"));
        cache.add("c");
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let cache = NonceCache::new(2);
        cache.add("a");
        cache.add("b");
        cache.add("a");
        assert_eq!(cache.tokens(), vec!["a", "b"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = NonceCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.add("a");
        cache.add("b");
        assert_eq!(cache.tokens(), vec!["b"]);
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let cache = NonceCache::new(usize::MAX);
        assert_eq!(cache.capacity(), usize::MAX);
        cache.add("a");
        cache.add("b");
        assert_eq!(cache.tokens(), vec!["a", "b"]);
    }

    #[test]
    fn test_concurrent_adds_stay_bounded() {
        let cache = Arc::new(NonceCache::new(DEFAULT_NONCE_CACHE_SIZE));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let token = format!("{t}-{i}");
                        cache.add(token.clone());
                        let _ = cache.contains(&token);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.len(), DEFAULT_NONCE_CACHE_SIZE);
    }

    proptest! {
        #[test]
        fn keeps_exactly_the_newest(capacity in 1usize..10, extra in 1usize..20) {
            let cache = NonceCache::new(capacity);
            let tokens: Vec<String> = (0..capacity + extra).map(|i| format!("T{i}")).collect();
            for t in &tokens {
                cache.add(t.as_str());
            }
            prop_assert_eq!(cache.len(), capacity);
            let (evicted, kept) = tokens.split_at(extra);
            prop_assert_eq!(cache.tokens(), kept.to_vec());
            for t in evicted {
                prop_assert!(!cache.contains(t));
            }
        }
    }
}
