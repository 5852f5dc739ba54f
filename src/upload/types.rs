use std::fmt;
use std::path::PathBuf;

use crate::analysis::AnalysisResult;
use crate::error::UploadError;

/// Identifier of a tracked upload. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub(crate) u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Uploading,
    Processing,
    Complete,
    Error(String),
}

impl FileStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FileStatus::Complete | FileStatus::Error(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Uploading => "uploading",
            FileStatus::Processing => "processing",
            FileStatus::Complete => "complete",
            FileStatus::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFileRecord {
    pub id: RecordId,
    pub name: String,
    pub size_bytes: u64,
    pub progress: u8,
    pub status: FileStatus,
}

impl UploadedFileRecord {
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            FileStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// A file offered for upload, before validation.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub name: String,
    pub size_bytes: u64,
}

impl CandidateFile {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size_bytes,
        }
    }

    /// Reads name and size from the filesystem.
    pub fn from_path(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self {
            size_bytes: metadata.len(),
            name,
            path,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// User-facing message produced by the session; the host decides how to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Sent by upload tasks back to the thread that owns the session.
#[derive(Debug)]
pub enum UploadEvent {
    Processing(RecordId),
    Finished {
        id: RecordId,
        outcome: Result<Option<AnalysisResult>, UploadError>,
    },
}
