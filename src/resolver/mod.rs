//! Fallback query resolution for rubric and exemplar records.

pub mod knowledge;
pub mod types;


pub use knowledge::KnowledgeResolver;
pub use types::{ResolveSource, Resolution};
