use std::future::Future;
use std::sync::Arc;

use super::error::StoreResult;
use super::model::{Document, Query, WriteBatch};

/// Read/write access to the managed document database.
///
/// The resolver only calls [`DocumentStore::query`]; the bulk uploader only calls
/// [`DocumentStore::commit`]. Query results come back in the store's default ordering.
pub trait DocumentStore: Send + Sync {
    fn query(&self, query: &Query) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    fn commit(&self, batch: WriteBatch) -> impl Future<Output = StoreResult<()>> + Send;
}

impl<S: DocumentStore> DocumentStore for Arc<S> {
    fn query(&self, query: &Query) -> impl Future<Output = StoreResult<Vec<Document>>> + Send {
        (**self).query(query)
    }

    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send {
        (**self).get(collection, id)
    }

    fn commit(&self, batch: WriteBatch) -> impl Future<Output = StoreResult<()>> + Send {
        (**self).commit(batch)
    }
}
