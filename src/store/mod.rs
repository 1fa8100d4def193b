//! Backing document store (Firestore) access.

pub mod client;
pub mod error;
pub mod firestore;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::DocumentStore;
pub use error::{StoreError, StoreResult};
pub use firestore::FirestoreClient;
#[cfg(any(test, feature = "mock"))]
pub use mock::MemoryStore;
pub use model::{Document, FieldFilter, FieldValue, Query, Write, WriteBatch};
