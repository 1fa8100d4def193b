//! Stored record types (rubrics, exemplars, upload summary).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    EXAMPLES_COLLECTION, FIELD_CONTENT, FIELD_CREATED_AT, FIELD_DOMAIN, FIELD_GENRE, FIELD_GRADE,
    FIELD_LEVEL, FIELD_SOURCE_PATH, FIELD_STAGE, FIELD_UPDATED_AT, META_COLLECTION,
    RUBRICS_COLLECTION, STATS_DOCUMENT_ID,
};
use crate::store::{Document, DocumentStore, FieldValue, StoreResult};

#[cfg(test)]
mod tests;

/// A record type the resolver can look up and cache.
pub trait KnowledgeRecord: From<Document> + Clone + Send + Sync + 'static {
    /// Collection the record lives in.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// An assessment rubric. Stage and grade use the rubric vocabulary (`초등학교`, `1-2학년`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricRecord {
    pub id: String,
    pub stage: String,
    pub grade: String,
    pub genre: String,
    pub domain: String,
    pub content: String,
    pub source_path: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Document> for RubricRecord {
    fn from(doc: Document) -> Self {
        Self {
            stage: doc.text(FIELD_STAGE),
            grade: doc.text(FIELD_GRADE),
            genre: doc.text(FIELD_GENRE),
            domain: doc.text(FIELD_DOMAIN),
            content: doc.text(FIELD_CONTENT),
            source_path: doc.text(FIELD_SOURCE_PATH),
            created_at: doc.timestamp_field(FIELD_CREATED_AT),
            updated_at: doc.timestamp_field(FIELD_UPDATED_AT),
            id: doc.id,
        }
    }
}

impl KnowledgeRecord for RubricRecord {
    const COLLECTION: &'static str = RUBRICS_COLLECTION;

    fn id(&self) -> &str {
        &self.id
    }
}

/// An exemplar writing sample. Stage uses the example vocabulary (`초등`), level is `상`/`중`/`하`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub id: String,
    pub stage: String,
    pub genre: String,
    pub level: String,
    pub content: String,
    pub source_path: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Document> for ExampleRecord {
    fn from(doc: Document) -> Self {
        Self {
            stage: doc.text(FIELD_STAGE),
            genre: doc.text(FIELD_GENRE),
            level: doc.text(FIELD_LEVEL),
            content: doc.text(FIELD_CONTENT),
            source_path: doc.text(FIELD_SOURCE_PATH),
            created_at: doc.timestamp_field(FIELD_CREATED_AT),
            updated_at: doc.timestamp_field(FIELD_UPDATED_AT),
            id: doc.id,
        }
    }
}

impl KnowledgeRecord for ExampleRecord {
    const COLLECTION: &'static str = EXAMPLES_COLLECTION;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Upload summary stored at `ssakdb_meta/stats`. Diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub total_documents: u64,
    pub collections: BTreeMap<String, u64>,
    pub schema_version: String,
    pub updated_at: DateTime<Utc>,
}

impl CollectionStats {
    const FIELD_TOTAL: &'static str = "total_documents";
    const FIELD_COLLECTIONS: &'static str = "collections";
    const FIELD_SCHEMA_VERSION: &'static str = "schema_version";

    pub fn to_document(&self, id: &str) -> Document {
        let collections = self
            .collections
            .iter()
            .map(|(name, count)| (name.clone(), FieldValue::Integer(*count as i64)))
            .collect();

        Document::new(id)
            .with_field(Self::FIELD_TOTAL, self.total_documents as i64)
            .with_field(Self::FIELD_COLLECTIONS, FieldValue::Map(collections))
            .with_field(Self::FIELD_SCHEMA_VERSION, self.schema_version.as_str())
            .with_field(FIELD_UPDATED_AT, self.updated_at)
    }

    /// Returns `None` when required fields are missing or mistyped.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let total_documents = doc.get(Self::FIELD_TOTAL)?.as_i64()?;
        let collections = doc
            .get(Self::FIELD_COLLECTIONS)?
            .as_map()?
            .iter()
            .map(|(name, count)| Some((name.clone(), u64::try_from(count.as_i64()?).ok()?)))
            .collect::<Option<BTreeMap<_, _>>>()?;

        Some(Self {
            total_documents: u64::try_from(total_documents).ok()?,
            collections,
            schema_version: doc.str_field(Self::FIELD_SCHEMA_VERSION)?.to_string(),
            updated_at: doc.timestamp_field(FIELD_UPDATED_AT)?,
        })
    }

    /// Reads the summary written by the last upload, if any.
    pub async fn fetch<S: DocumentStore>(store: &S) -> StoreResult<Option<Self>> {
        let doc = store.get(META_COLLECTION, STATS_DOCUMENT_ID).await?;
        Ok(doc.as_ref().and_then(Self::from_document))
    }
}
