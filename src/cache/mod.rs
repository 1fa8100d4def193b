//! In-process knowledge cache (rubric and example lookups).

pub mod knowledge;
pub mod types;

#[cfg(test)]
mod knowledge_tests;

pub use knowledge::{KnowledgeCache, KnowledgeCaches};
pub use types::{CacheEntry, CacheLookup};
