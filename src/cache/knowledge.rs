//! Per-collection knowledge cache (in-memory, TTL only).
//!
//! Keys are BLAKE3 hashes of the normalized lookup fields (see [`crate::hashing::lookup_key`]).
//! Values are [`CacheEntry`]s, so a confirmed "not found" is cached just like a record.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use super::types::{CacheEntry, CacheLookup};
use crate::constants::DEFAULT_CACHE_TTL_SECS;
use crate::records::{ExampleRecord, RubricRecord};

/// TTL-bounded cache of lookup results for one collection.
///
/// No capacity bound: entries only leave through TTL expiry or [`KnowledgeCache::invalidate_all`].
/// Concurrent writers to the same key are last-write-wins.
pub struct KnowledgeCache<T: Clone + Send + Sync + 'static> {
    entries: Cache<[u8; 32], CacheEntry<T>>,
    ttl: Duration,
}

impl<T: Clone + Send + Sync + 'static> KnowledgeCache<T> {
    #[inline]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    /// Returns the cached value if its age is below the TTL.
    pub fn get(&self, key: &[u8; 32]) -> CacheLookup<T> {
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => CacheLookup::Hit(entry.into_record()),
            Some(_) => {
                self.entries.invalidate(key);
                CacheLookup::Miss
            }
            None => CacheLookup::Miss,
        }
    }

    /// Stores a record (or `None` for "not found"), overwriting any prior entry.
    #[inline]
    pub fn put(&self, key: [u8; 32], record: Option<T>) {
        self.entries.insert(key, CacheEntry::new(record));
    }

    /// Returns the raw entry, fresh or not, without touching it.
    #[inline]
    pub fn entry(&self, key: &[u8; 32]) -> Option<CacheEntry<T>> {
        self.entries.get(key)
    }

    #[inline]
    pub fn contains(&self, key: &[u8; 32]) -> bool {
        self.get(key).is_hit()
    }

    #[inline]
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate entry count (call [`Self::run_pending_tasks`] first for an exact figure).
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<T: Clone + Send + Sync + 'static> Default for KnowledgeCache<T> {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl<T: Clone + Send + Sync + 'static> std::fmt::Debug for KnowledgeCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// The rubric cache and the example cache, sharing one TTL.
///
/// Built once at startup and handed to the resolver; clones share the same entries.
#[derive(Clone, Debug)]
pub struct KnowledgeCaches {
    rubrics: Arc<KnowledgeCache<RubricRecord>>,
    examples: Arc<KnowledgeCache<ExampleRecord>>,
}

impl KnowledgeCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            rubrics: Arc::new(KnowledgeCache::new(ttl)),
            examples: Arc::new(KnowledgeCache::new(ttl)),
        }
    }

    #[inline]
    pub fn rubrics(&self) -> &KnowledgeCache<RubricRecord> {
        &self.rubrics
    }

    #[inline]
    pub fn examples(&self) -> &KnowledgeCache<ExampleRecord> {
        &self.examples
    }

    pub fn invalidate_all(&self) {
        self.rubrics.invalidate_all();
        self.examples.invalidate_all();
    }

    pub fn ttl(&self) -> Duration {
        self.rubrics.ttl()
    }
}

impl Default for KnowledgeCaches {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}
