//! Ordered-fallback lookup of rubrics and exemplars.
//!
//! Each call walks a fixed chain: cache, exact match, relaxed match, exhausted. The first hit
//! wins and is cached; a full miss caches `None`. Store errors end the chain with `None` and
//! are never cached, retried, or returned to the caller.

use tracing::{debug, error, info, instrument, warn};

use super::types::{ResolveSource, Resolution};
use crate::cache::{CacheLookup, KnowledgeCache, KnowledgeCaches};
use crate::constants::{FIELD_DOMAIN, FIELD_GENRE, FIELD_GRADE, FIELD_LEVEL, FIELD_STAGE};
use crate::hashing::{EXAMPLE_KEY_KIND, RUBRIC_KEY_KIND, key_prefix, lookup_key};
use crate::labels::LabelTable;
use crate::records::{ExampleRecord, KnowledgeRecord, RubricRecord};
use crate::store::{DocumentStore, Query};

/// Resolves rubric and exemplar records for grading requests.
///
/// Construct once at startup and share (e.g. behind an `Arc`); all state lives in the owned
/// caches.
pub struct KnowledgeResolver<S: DocumentStore> {
    store: S,
    labels: LabelTable,
    caches: KnowledgeCaches,
}

impl<S: DocumentStore> std::fmt::Debug for KnowledgeResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeResolver")
            .field("labels", &self.labels)
            .field("caches", &self.caches)
            .finish()
    }
}

impl<S: DocumentStore> KnowledgeResolver<S> {
    pub fn new(store: S, labels: LabelTable, caches: KnowledgeCaches) -> Self {
        Self {
            store,
            labels,
            caches,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn caches(&self) -> &KnowledgeCaches {
        &self.caches
    }

    /// Drops every cached lookup in both collections.
    pub fn reset_caches(&self) {
        self.caches.invalidate_all();
    }

    pub async fn resolve_rubric(
        &self,
        grade_level: &str,
        genre: &str,
        domain: &str,
    ) -> Option<RubricRecord> {
        self.resolve_rubric_traced(grade_level, genre, domain)
            .await
            .into_record()
    }

    pub async fn resolve_example(
        &self,
        grade_level: &str,
        genre: &str,
        proficiency: &str,
    ) -> Option<ExampleRecord> {
        self.resolve_example_traced(grade_level, genre, proficiency)
            .await
            .into_record()
    }

    /// Rubric chain: (stage, grade, genre, domain), then (stage, genre, domain).
    #[instrument(skip(self))]
    pub async fn resolve_rubric_traced(
        &self,
        grade_level: &str,
        genre: &str,
        domain: &str,
    ) -> Resolution<RubricRecord> {
        let labels = self.labels.grade(grade_level);
        let genre = genre.trim();
        let domain = domain.trim();

        let key = lookup_key(
            RUBRIC_KEY_KIND,
            &[
                labels.rubric_stage.as_str(),
                labels.grade_band.as_str(),
                genre,
                domain,
            ],
        );

        let primary = Query::new(RubricRecord::COLLECTION)
            .filter(FIELD_STAGE, &labels.rubric_stage)
            .filter(FIELD_GRADE, &labels.grade_band)
            .filter(FIELD_GENRE, genre)
            .filter(FIELD_DOMAIN, domain)
            .limit(1);
        let relaxed = Query::new(RubricRecord::COLLECTION)
            .filter(FIELD_STAGE, &labels.rubric_stage)
            .filter(FIELD_GENRE, genre)
            .filter(FIELD_DOMAIN, domain)
            .limit(1);

        self.resolve_chain(self.caches.rubrics(), key, primary, relaxed)
            .await
    }

    /// Example chain: (stage, genre, level), then (genre, level).
    #[instrument(skip(self))]
    pub async fn resolve_example_traced(
        &self,
        grade_level: &str,
        genre: &str,
        proficiency: &str,
    ) -> Resolution<ExampleRecord> {
        let labels = self.labels.normalize(grade_level, proficiency);
        let genre = genre.trim();

        let key = lookup_key(
            EXAMPLE_KEY_KIND,
            &[
                labels.example_stage.as_str(),
                genre,
                labels.proficiency.as_str(),
            ],
        );

        let primary = Query::new(ExampleRecord::COLLECTION)
            .filter(FIELD_STAGE, &labels.example_stage)
            .filter(FIELD_GENRE, genre)
            .filter(FIELD_LEVEL, &labels.proficiency)
            .limit(1);
        let relaxed = Query::new(ExampleRecord::COLLECTION)
            .filter(FIELD_GENRE, genre)
            .filter(FIELD_LEVEL, &labels.proficiency)
            .limit(1);

        self.resolve_chain(self.caches.examples(), key, primary, relaxed)
            .await
    }

    async fn resolve_chain<T: KnowledgeRecord>(
        &self,
        cache: &KnowledgeCache<T>,
        key: [u8; 32],
        primary: Query,
        relaxed: Query,
    ) -> Resolution<T> {
        let key_hex = key_prefix(&key);

        if let CacheLookup::Hit(record) = cache.get(&key) {
            debug!(key = %key_hex, found = record.is_some(), "knowledge cache hit");
            return Resolution::new(record, ResolveSource::Cache);
        }

        for (query, source) in [
            (primary, ResolveSource::Primary),
            (relaxed, ResolveSource::Relaxed),
        ] {
            match self.store.query(&query).await {
                Ok(docs) => {
                    if let Some(doc) = docs.into_iter().next() {
                        let record = T::from(doc);
                        info!(
                            key = %key_hex,
                            source = %source,
                            id = record.id(),
                            "resolved {}", T::COLLECTION
                        );
                        cache.put(key, Some(record.clone()));
                        return Resolution::new(Some(record), source);
                    }
                    debug!(query = %query, "no match");
                }
                Err(e) => {
                    error!(
                        query = %query,
                        error = %e,
                        "store lookup failed, continuing without {}", T::COLLECTION
                    );
                    return Resolution::new(None, ResolveSource::Degraded);
                }
            }
        }

        warn!(key = %key_hex, "no {} matched after fallback", T::COLLECTION);
        cache.put(key, None);
        Resolution::new(None, ResolveSource::Exhausted)
    }
}
