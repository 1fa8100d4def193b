//! Bulk upload of a source tree into the document store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use super::error::{IngestError, IngestResult};
use super::frontmatter::parse_source;
use super::ids::{IdentityAllocator, base_identity};
use super::routing::route_collection;
use crate::config::Config;
use crate::constants::{
    DEFAULT_BATCH_PAUSE_MS, DEFAULT_BATCH_SIZE, FIELD_CONTENT, FIELD_CREATED_AT,
    FIELD_SOURCE_PATH, FIELD_UPDATED_AT, MAX_BATCH_WRITES, META_COLLECTION, SCHEMA_VERSION,
    SOURCE_EXTENSION, STATS_DOCUMENT_ID,
};
use crate::records::CollectionStats;
use crate::store::{Document, DocumentStore, WriteBatch};

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Documents per commit, `1..=MAX_BATCH_WRITES`.
    pub batch_size: usize,
    /// Pause between consecutive commits.
    pub batch_pause: Duration,
    /// Version stamped on the summary record.
    pub schema_version: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_pause: Duration::from_millis(DEFAULT_BATCH_PAUSE_MS),
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

impl UploadConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            batch_pause: config.batch_pause,
            ..Default::default()
        }
    }
}

/// A document ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDocument {
    pub collection: &'static str,
    pub document: Document,
}

/// A source file left out of the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Everything an upload would write, before anything is written.
#[derive(Debug, Clone, Default)]
pub struct UploadPlan {
    pub documents: Vec<PlannedDocument>,
    pub skipped: Vec<SkippedFile>,
}

impl UploadPlan {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn collection_counts(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for planned in &self.documents {
            *counts.entry(planned.collection.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Outcome of [`BulkUploader::upload`].
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub documents_written: usize,
    pub batches_committed: usize,
    pub skipped: Vec<SkippedFile>,
    pub stats: CollectionStats,
}

/// Walks a source tree, parses front matter, and writes documents in bounded batches.
pub struct BulkUploader<S: DocumentStore> {
    store: S,
    config: UploadConfig,
}

impl<S: DocumentStore> BulkUploader<S> {
    pub fn new(store: S, config: UploadConfig) -> IngestResult<Self> {
        if config.batch_size == 0 || config.batch_size > MAX_BATCH_WRITES {
            return Err(IngestError::InvalidBatchSize {
                value: config.batch_size,
                max: MAX_BATCH_WRITES,
            });
        }
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Parses every source file under `root` without writing anything.
    ///
    /// Unreadable or malformed files are logged and listed in [`UploadPlan::skipped`].
    #[instrument(skip(self))]
    pub fn plan(&self, root: &Path) -> IngestResult<UploadPlan> {
        self.plan_at(root, Utc::now())
    }

    fn plan_at(&self, root: &Path, now: DateTime<Utc>) -> IngestResult<UploadPlan> {
        if !root.is_dir() {
            return Err(IngestError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let files = collect_source_files(root)?;

        let mut plan = UploadPlan::default();
        let mut ids = IdentityAllocator::new();

        for path in files {
            let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    error!(path = %relative.display(), error = %e, "skipping unreadable source file");
                    plan.skipped.push(SkippedFile {
                        path: relative,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let source = match parse_source(&text) {
                Ok(source) => source,
                Err(e) => {
                    error!(path = %relative.display(), error = %e, "skipping malformed source file");
                    plan.skipped.push(SkippedFile {
                        path: relative,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let collection = route_collection(&relative);
            let stem = relative
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let id = ids.assign(collection, &base_identity(&source, &stem));
            let source_path = relative_path_string(&relative);

            debug!(collection, id = %id, source_path = %source_path, "planned document");

            let mut document = Document::new(id);
            for (key, value) in source.metadata {
                document.set(key, value);
            }
            document.set(FIELD_CONTENT, source.body);
            document.set(FIELD_SOURCE_PATH, source_path);
            document.set(FIELD_CREATED_AT, now);
            document.set(FIELD_UPDATED_AT, now);

            plan.documents.push(PlannedDocument {
                collection,
                document,
            });
        }

        info!(
            documents = plan.len(),
            skipped = plan.skipped.len(),
            "upload plan ready"
        );
        Ok(plan)
    }

    /// Plans and writes everything under `root`, then writes the summary record.
    #[instrument(skip(self))]
    pub async fn upload(&self, root: &Path) -> IngestResult<UploadReport> {
        let now = Utc::now();
        let plan = self.plan_at(root, now)?;
        self.commit_plan(plan, now).await
    }

    /// Writes a plan in batches of at most `batch_size`, then the summary record.
    ///
    /// The first failed batch aborts the upload; earlier batches stay written and the
    /// summary record is not touched.
    pub async fn commit_plan(
        &self,
        plan: UploadPlan,
        now: DateTime<Utc>,
    ) -> IngestResult<UploadReport> {
        let batch_size = self.config.batch_size;
        let total_batches = plan.len().div_ceil(batch_size);
        let collections = plan.collection_counts();
        let documents_written = plan.len();

        let mut pending = plan.documents.into_iter().peekable();
        let mut batch_no = 0;
        while pending.peek().is_some() {
            let mut batch = WriteBatch::with_capacity(batch_size);
            for planned in pending.by_ref().take(batch_size) {
                batch.set(planned.collection, planned.document);
            }
            batch_no += 1;

            let writes = batch.len();
            self.store
                .commit(batch)
                .await
                .map_err(|source| IngestError::BatchFailed {
                    batch: batch_no,
                    total: total_batches,
                    source,
                })?;
            info!(batch = batch_no, total = total_batches, writes, "batch committed");

            if batch_no < total_batches && !self.config.batch_pause.is_zero() {
                tokio::time::sleep(self.config.batch_pause).await;
            }
        }

        let stats = CollectionStats {
            total_documents: documents_written as u64,
            collections,
            schema_version: self.config.schema_version.clone(),
            updated_at: now,
        };
        let mut summary = WriteBatch::with_capacity(1);
        summary.set(META_COLLECTION, stats.to_document(STATS_DOCUMENT_ID));
        self.store
            .commit(summary)
            .await
            .map_err(IngestError::SummaryFailed)?;

        if !plan.skipped.is_empty() {
            warn!(skipped = plan.skipped.len(), "some source files were skipped");
        }
        info!(
            documents = documents_written,
            batches = batch_no,
            "upload complete"
        );

        Ok(UploadReport {
            documents_written,
            batches_committed: batch_no,
            skipped: plan.skipped,
            stats,
        })
    }
}

/// Every `*.md` file under `root`. Symbolic links are not followed and hidden entries
/// (leading `.`) are pruned along with their subtrees.
fn collect_source_files(root: &Path) -> IngestResult<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| IngestError::Io {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Relative path with `/` separators regardless of platform.
fn relative_path_string(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
