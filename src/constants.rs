//! Cross-cutting, shared constants.
//!
//! Collection names and field names are part of the stored data contract; the bulk uploader
//! writes them and the resolver queries them, so both sides import them from here.

/// Collection holding assessment rubrics.
pub const RUBRICS_COLLECTION: &str = "rubrics";
/// Collection holding exemplar writing samples.
pub const EXAMPLES_COLLECTION: &str = "examples";
/// Catch-all collection for source files no routing rule claims.
pub const MISC_COLLECTION: &str = "misc";

/// Collection and document id of the upload summary record.
pub const META_COLLECTION: &str = "ssakdb_meta";
pub const STATS_DOCUMENT_ID: &str = "stats";

/// Schema version stamped on the summary record by the uploader.
pub const SCHEMA_VERSION: &str = "2.0";

pub const FIELD_STAGE: &str = "stage";
pub const FIELD_GRADE: &str = "grade";
pub const FIELD_GENRE: &str = "genre";
pub const FIELD_DOMAIN: &str = "domain";
pub const FIELD_LEVEL: &str = "level";
pub const FIELD_CONTENT: &str = "content";
pub const FIELD_SOURCE_PATH: &str = "source_path";
pub const FIELD_CREATED_AT: &str = "created_at";
pub const FIELD_UPDATED_AT: &str = "updated_at";

/// Metadata fields joined (in this order) into a document identity.
pub const IDENTITY_FIELDS: [&str; 5] = [
    FIELD_STAGE,
    FIELD_GRADE,
    FIELD_GENRE,
    FIELD_DOMAIN,
    FIELD_LEVEL,
];

/// Separator used when joining identity fields.
pub const IDENTITY_SEPARATOR: &str = "_";

/// Hard ceiling on writes per commit imposed by the backing store.
pub const MAX_BATCH_WRITES: usize = 500;

/// Default documents per upload batch (kept below [`MAX_BATCH_WRITES`]).
pub const DEFAULT_BATCH_SIZE: usize = 400;

/// Default pause between upload batches.
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 1_000;

/// Default knowledge cache TTL (30 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

/// File extension picked up by the bulk uploader.
pub const SOURCE_EXTENSION: &str = "md";
