use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("front matter opened with '---' but never closed")]
    UnterminatedFrontMatter,

    #[error("front matter is not valid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("front matter must be a key/value mapping")]
    NotAMapping,

    #[error("front matter key '{key}' has an unsupported value (expected text or a list)")]
    UnsupportedValue { key: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source root {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("invalid batch size {value}: must be between 1 and {max}")]
    InvalidBatchSize { value: usize, max: usize },

    #[error("batch {batch} of {total} failed: {source}")]
    BatchFailed {
        batch: usize,
        total: usize,
        #[source]
        source: StoreError,
    },

    #[error("failed to write upload summary: {0}")]
    SummaryFailed(#[source] StoreError),
}

pub type IngestResult<T> = Result<T, IngestError>;
