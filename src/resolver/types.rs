use serde::Serialize;

/// Where a resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveSource {
    /// Served from the knowledge cache (possibly a cached "not found").
    Cache,
    /// Exact match on every discriminating field.
    Primary,
    /// Match after dropping the most specific field.
    Relaxed,
    /// Nothing matched; the absence was cached.
    Exhausted,
    /// The store failed; nothing was cached.
    Degraded,
}

impl ResolveSource {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveSource::Cache => "cache",
            ResolveSource::Primary => "primary",
            ResolveSource::Relaxed => "relaxed",
            ResolveSource::Exhausted => "exhausted",
            ResolveSource::Degraded => "degraded",
        }
    }

    /// Returns `true` if the backing store was consulted.
    #[inline]
    pub fn queried_store(&self) -> bool {
        !matches!(self, ResolveSource::Cache)
    }
}

impl std::fmt::Display for ResolveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved record (or its absence) plus where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    pub record: Option<T>,
    pub source: ResolveSource,
}

impl<T> Resolution<T> {
    #[inline]
    pub fn new(record: Option<T>, source: ResolveSource) -> Self {
        Self { record, source }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.record.is_some()
    }

    #[inline]
    pub fn into_record(self) -> Option<T> {
        self.record
    }
}
