use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("failed to read label table at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed label table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("default grade code '{code}' has no entry in the label table")]
    MissingDefaultGrade { code: String },

    #[error("default proficiency code '{code}' has no entry in the label table")]
    MissingDefaultProficiency { code: String },

    #[error("label table entry '{code}' has an empty {field} label")]
    EmptyLabel { code: String, field: &'static str },
}

pub type LabelResult<T> = Result<T, LabelError>;
