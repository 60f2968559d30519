//! Bounded LRU cache of decrypted V2 chunks, shared across readers.
//!
//! Keyed by (blob identity, chunk index); a non-positive capacity disables
//! caching entirely (every operation becomes a no-op), matching the spec's
//! "zero or negative disables caching" knob.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

pub type CacheKey = (String, u64);

enum Inner {
    Disabled,
    Enabled(Mutex<LruCache<CacheKey, Vec<u8>>>),
}

/// Thread-safe bounded LRU cache of decrypted chunk bytes.
pub struct ChunkCache {
    inner: Inner,
}

impl ChunkCache {
    /// `capacity <= 0` disables caching.
    pub fn new(capacity: i64) -> Self {
        let inner = match NonZeroUsize::new(capacity.max(0) as usize) {
            Some(n) => Inner::Enabled(Mutex::new(LruCache::new(n))),
            None => Inner::Disabled,
        };
        Self { inner }
    }

    /// Looks up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        match &self.inner {
            Inner::Disabled => None,
            Inner::Enabled(lock) => lock.lock().unwrap().get(key).cloned(),
        }
    }

    /// Inserts `key` → `value`, evicting the least-recently-used entry if the
    /// cache is at capacity. A no-op when caching is disabled.
    pub fn insert(&self, key: CacheKey, value: Vec<u8>) {
        if let Inner::Enabled(lock) = &self.inner {
            lock.lock().unwrap().put(key, value);
        }
    }
}

/// A [`ChunkCache`] shared across multiple [`crate::reader::RandomAccessReader`]s.
pub type SharedChunkCache = Arc<ChunkCache>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_is_strict_lru() {
        let cache = ChunkCache::new(2);
        cache.insert(("blob".into(), 0), vec![b'A']);
        cache.insert(("blob".into(), 1), vec![b'B']);
        cache.insert(("blob".into(), 2), vec![b'C']);

        assert!(cache.get(&("blob".into(), 0)).is_none());
        assert_eq!(cache.get(&("blob".into(), 1)).unwrap(), vec![b'B']);
        assert_eq!(cache.get(&("blob".into(), 2)).unwrap(), vec![b'C']);
    }

    #[test]
    fn lookup_promotes_to_most_recently_used() {
        let cache = ChunkCache::new(2);
        cache.insert(("blob".into(), 0), vec![b'A']);
        cache.insert(("blob".into(), 1), vec![b'B']);

        // Touch A so B becomes the least-recently-used entry.
        assert!(cache.get(&("blob".into(), 0)).is_some());
        cache.insert(("blob".into(), 2), vec![b'C']);

        assert!(cache.get(&("blob".into(), 1)).is_none());
        assert!(cache.get(&("blob".into(), 0)).is_some());
        assert!(cache.get(&("blob".into(), 2)).is_some());
    }

    #[test]
    fn nonpositive_capacity_disables_caching() {
        let cache = ChunkCache::new(0);
        cache.insert(("blob".into(), 0), vec![b'A']);
        assert!(cache.get(&("blob".into(), 0)).is_none());
    }
}
