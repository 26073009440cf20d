//! A bounded, concurrent-safe cache used for the three LRU maps the
//! consensus context keeps (slot→proposer, slot→signed-beacon-block,
//! blockNumber→slot). `lru::LruCache` itself is not `Sync`; wrapping it in a
//! `parking_lot::Mutex` gives the multi-reader access the cache needs
//! without pulling in a second locking primitive beyond what the rest of the
//! workspace already uses for the validator maps.

use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;

pub struct BoundedCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Eq + Hash, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_used() {
        let cache: BoundedCache<u64, &str> = BoundedCache::new(NonZeroUsize::new(2).unwrap());
        cache.put(1, "one");
        cache.put(2, "two");
        cache.get(&1);
        cache.put(3, "three");
        assert_eq!(cache.get(&1), Some("one"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some("three"));
    }
}
