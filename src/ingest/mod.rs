//! Bulk ingestion of markdown sources with YAML front matter.
//!
//! Each `*.md` file under the upload root becomes one document. The target collection comes
//! from the file's directory names ([`routing`]), the document id from its identity fields
//! ([`ids`]), and every front matter key is stored as a field next to `content`.

pub mod error;
pub mod frontmatter;
pub mod ids;
pub mod routing;
pub mod uploader;


pub use error::{IngestError, IngestResult};
pub use frontmatter::{MetaValue, SourceDocument, parse_source};
pub use ids::{IdentityAllocator, base_identity};
pub use routing::{COLLECTIONS, route_collection};
pub use uploader::{
    BulkUploader, PlannedDocument, SkippedFile, UploadConfig, UploadPlan, UploadReport,
};
