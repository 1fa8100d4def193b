//! SsakDB: the knowledge base behind the writing-assessment grader.
//!
//! Rubrics and exemplar texts live in a Firestore-compatible document store. This crate
//! loads them there from markdown sources ([`ingest`]) and serves them back to the grading
//! path through a cached, ordered-fallback lookup ([`resolver`]), optionally over HTTP
//! ([`gateway`]).
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Environment configuration
//! - [`KnowledgeResolver`], [`Resolution`], [`ResolveSource`] - Lookup with fallback
//! - [`KnowledgeCaches`] - Per-collection TTL caches
//! - [`LabelTable`] - Grade / proficiency code to stored-label mapping
//! - [`DocumentStore`], [`FirestoreClient`] - Backing store access
//! - [`BulkUploader`] - Markdown tree to batched writes
//!
//! ## Test/Mock Support
//! [`MemoryStore`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod gateway;
pub mod hashing;
pub mod ingest;
pub mod labels;
pub mod records;
pub mod resolver;
pub mod store;

pub use cache::{CacheEntry, CacheLookup, KnowledgeCache, KnowledgeCaches};
pub use config::{Config, ConfigError};
pub use gateway::{GatewayError, GatewayState, SSAK_LOOKUP_HEADER, create_router};
pub use hashing::{key_prefix, lookup_key};
pub use ingest::{
    BulkUploader, IngestError, IngestResult, UploadConfig, UploadPlan, UploadReport,
    parse_source, route_collection,
};
pub use labels::{GradeLevel, LabelError, LabelTable, NormalizedLabels, ProficiencyLevel};
pub use records::{CollectionStats, ExampleRecord, KnowledgeRecord, RubricRecord};
pub use resolver::{KnowledgeResolver, Resolution, ResolveSource};
#[cfg(any(test, feature = "mock"))]
pub use store::MemoryStore;
pub use store::{
    Document, DocumentStore, FieldValue, FirestoreClient, Query, StoreError, StoreResult,
    WriteBatch,
};
