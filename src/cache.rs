//! Small bounded memoization cache.
//!
//! Entries are immutable once inserted and handed out as [`Arc`]s, so readers
//! never observe partially built values. Eviction is least-recently-used and
//! is delegated to [`cached::SizedCache`].

use cached::{Cached, SizedCache};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// Fixed-capacity LRU cache keyed on the full input of a pure function.
#[derive(Debug)]
pub struct BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // `None` when caching is disabled; `SizedCache` rejects a zero size.
    store: Option<Mutex<SizedCache<K, Arc<V>>>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of zero disables caching: `get` always misses and `insert`
    /// stores nothing.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: (capacity > 0).then(|| Mutex::new(SizedCache::with_size(capacity))),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map_or(0, |store| store.cache_size())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a value, marking it as most recently used.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock()?.cache_get(key).cloned()
    }

    /// Insert a value, evicting the least recently used entry when full.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if let Some(mut store) = self.lock() {
            store.cache_set(key, value.clone());
        }
        value
    }

    pub fn clear(&self) {
        if let Some(mut store) = self.lock() {
            store.cache_clear();
        }
    }

    fn lock(&self) -> Option<MutexGuard<'_, SizedCache<K, Arc<V>>>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.store
            .as_ref()
            .map(|store| store.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}
