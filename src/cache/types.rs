use std::time::{Duration, Instant};

/// A fetched record (or a confirmed absence) and when it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    record: Option<T>,
    fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    #[inline]
    pub fn new(record: Option<T>) -> Self {
        Self {
            record,
            fetched_at: Instant::now(),
        }
    }

    #[inline]
    pub fn record(&self) -> Option<&T> {
        self.record.as_ref()
    }

    #[inline]
    pub fn into_record(self) -> Option<T> {
        self.record
    }

    #[inline]
    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    #[inline]
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// Valid only while `now - fetched_at < ttl`.
    #[inline]
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Result of a [`super::KnowledgeCache`] lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    /// A fresh entry exists. `None` is a cached "not found".
    Hit(Option<T>),
    Miss,
}

impl<T> CacheLookup<T> {
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }

    #[inline]
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheLookup::Miss)
    }
}
