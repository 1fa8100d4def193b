use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by backing store operations.
pub enum StoreError {
    /// Could not reach the store endpoint.
    #[error("failed to connect to document store at '{url}': {message}")]
    ConnectionFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The store answered with a non-success status.
    #[error("request to '{url}' failed with status {status}: {message}")]
    RequestFailed {
        url: String,
        status: u16,
        message: String,
    },

    /// Query failed.
    #[error("failed to query '{collection}': {message}")]
    QueryFailed {
        /// Collection name.
        collection: String,
        /// Error message.
        message: String,
    },

    /// Batch commit failed.
    #[error("failed to commit batch of {writes} writes: {message}")]
    CommitFailed {
        /// Number of writes in the rejected batch.
        writes: usize,
        /// Error message.
        message: String,
    },

    /// The batch exceeds the store's per-commit ceiling.
    #[error("batch of {size} writes exceeds the store limit of {max}")]
    BatchTooLarge {
        /// Writes in the batch.
        size: usize,
        /// Ceiling.
        max: usize,
    },

    /// A response body could not be decoded.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// The client was built without a project id.
    #[error("document store project id is not configured")]
    MissingProject,
}

pub type StoreResult<T> = Result<T, StoreError>;
