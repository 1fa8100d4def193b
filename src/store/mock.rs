use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::constants::MAX_BATCH_WRITES;
use crate::store::{Document, DocumentStore, Query, StoreError, StoreResult, WriteBatch};

/// In-memory [`DocumentStore`] that records every query and commit.
///
/// Documents are kept ordered by id, which is the default result ordering of the real store.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    queries: RwLock<Vec<Query>>,
    commits: RwLock<Vec<usize>>,
    fail_queries: AtomicBool,
    fail_commits: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) a document directly, bypassing the commit log.
    pub fn insert(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(document.id.clone(), document);
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections.read().get(collection)?.get(id).cloned()
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn document_ids(&self, collection: &str) -> Vec<String> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every query issued so far, in order (failed attempts included).
    pub fn queries(&self) -> Vec<Query> {
        self.queries.read().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.read().len()
    }

    /// Size of every successful commit, in order.
    pub fn commits(&self) -> Vec<usize> {
        self.commits.read().clone()
    }

    pub fn clear_logs(&self) {
        self.queries.write().clear();
        self.commits.write().clear();
    }

    /// Makes every subsequent query fail until switched back.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent commit fail until switched back.
    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }
}

impl DocumentStore for MemoryStore {
    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.queries.write().push(query.clone());

        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed {
                collection: query.collection.clone(),
                message: "injected failure".to_string(),
            });
        }

        let collections = self.collections.read();
        let Some(collection) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(collection
            .values()
            .filter(|doc| doc.matches(&query.filters))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::QueryFailed {
                collection: collection.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(self.document(collection, id))
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.len() > MAX_BATCH_WRITES {
            return Err(StoreError::BatchTooLarge {
                size: batch.len(),
                max: MAX_BATCH_WRITES,
            });
        }
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::CommitFailed {
                writes: batch.len(),
                message: "injected failure".to_string(),
            });
        }

        let writes = batch.len();
        {
            let mut collections = self.collections.write();
            for write in batch.into_writes() {
                collections
                    .entry(write.collection)
                    .or_default()
                    .insert(write.document.id.clone(), write.document);
            }
        }
        self.commits.write().push(writes);
        Ok(())
    }
}
