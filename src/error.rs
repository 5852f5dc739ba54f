//! Error types for document intake and submission.
//!
//! Validation errors never create a record. Upload errors are terminal for the
//! record they belong to but never for the session.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid file type for {name}. Please upload a PDF or Word document.")]
    UnsupportedType { name: String },

    #[error("{name} is {size_bytes} bytes, which exceeds the {limit_bytes} byte limit.")]
    TooLarge {
        name: String,
        size_bytes: u64,
        limit_bytes: u64,
    },
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Failed to send request: {0}")]
    Transport(String),

    #[error("Failed to parse analysis response: {0}")]
    InvalidResponse(String),

    #[error("Analysis service reported an error: {0}")]
    Rejected(String),

    #[error("Upload task failed: {0}")]
    TaskFailed(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        UploadError::Transport(e.to_string())
    }
}
