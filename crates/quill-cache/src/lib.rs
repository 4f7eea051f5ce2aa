//! Bounded in-process caches for Quill.
//!
//! This crate provides [`TtlCache`], an owned key-value cache with two
//! eviction rules applied together:
//!
//! - **Time to live**: an entry older than the configured TTL is treated as
//!   absent and dropped on the next access.
//! - **Size bound**: when full, inserting evicts the least recently used entry.
//!
//! Caches are plain values with `&mut self` operations. Callers that share a
//! cache across threads wrap it themselves (see `quill_renderer::FrontmatterStore`).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use quill_cache::{CachePolicy, TtlCache};
//!
//! let policy = CachePolicy::new(Duration::from_secs(60), 2);
//! let mut cache = TtlCache::new(policy);
//!
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.put("c", 3); // evicts "a"
//!
//! assert_eq!(cache.get(&"a"), None);
//! assert_eq!(cache.get(&"c"), Some(&3));
//! ```

mod clock;

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;

pub use clock::{Clock, ManualClock, SystemClock};

/// Eviction settings for a [`TtlCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum age of an entry.
    pub ttl: Duration,
    /// Maximum number of live entries.
    pub max_entries: NonZeroUsize,
}

impl CachePolicy {
    /// Create a policy. A `max_entries` of zero is raised to one.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries: NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl Default for CachePolicy {
    /// 24 hours, 1000 entries.
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60), 1000)
    }
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Size-bounded LRU cache with per-entry time to live.
pub struct TtlCache<K, V> {
    entries: LruCache<K, Entry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K: Hash + Eq, V> TtlCache<K, V> {
    /// Create a cache reading time from the system clock.
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`.
    #[must_use]
    pub fn with_clock(policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: LruCache::new(policy.max_entries),
            ttl: policy.ttl,
            clock,
        }
    }

    /// Look up a live entry, dropping it if it has expired.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        let expired = now.duration_since(self.entries.peek(key)?.stored_at) >= self.ttl;
        if expired {
            self.entries.pop(key);
            tracing::debug!("cache entry expired");
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Check for a live entry without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.entries
            .peek(key)
            .is_some_and(|entry| now.duration_since(entry.stored_at) < self.ttl)
    }

    /// Store a value, replacing any previous entry for the key.
    ///
    /// Returns the replaced value, if any. When the cache is full the least
    /// recently used entry is evicted.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let entry = Entry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries.put(key, entry).map(|old| old.value)
    }

    /// Remove an entry regardless of age.
    pub fn evict(&mut self, key: &K) -> Option<V> {
        self.entries.pop(key).map(|entry| entry.value)
    }

    /// Number of stored entries, including ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Hash + Eq + Clone, V> TtlCache<K, V> {
    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.stored_at) >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            self.entries.pop(key);
        }
        expired.len()
    }
}
