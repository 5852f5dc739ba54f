use std::path::Path;

use crate::error::ValidationError;
use crate::upload::types::CandidateFile;

/// 25 MiB, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// A candidate that passed validation. Only [`validate`] produces one.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
    candidate: CandidateFile,
}

impl AcceptedFile {
    pub fn name(&self) -> &str {
        &self.candidate.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.candidate.size_bytes
    }

    pub fn path(&self) -> &Path {
        &self.candidate.path
    }

    pub fn mime_type(&self) -> &'static str {
        match extension_of(&self.candidate.name).as_deref() {
            Some("pdf") => "application/pdf",
            Some("doc") => "application/msword",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/octet-stream",
        }
    }
}

pub fn validate(candidate: CandidateFile) -> Result<AcceptedFile, ValidationError> {
    if !is_supported_name(&candidate.name) {
        return Err(ValidationError::UnsupportedType {
            name: candidate.name,
        });
    }

    if candidate.size_bytes > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            name: candidate.name,
            size_bytes: candidate.size_bytes,
            limit_bytes: MAX_UPLOAD_BYTES,
        });
    }

    Ok(AcceptedFile { candidate })
}

pub fn is_supported_name(name: &str) -> bool {
    extension_of(name)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension_of(name: &str) -> Option<String> {
    name.rfind('.')
        .map(|idx| name[idx + 1..].to_lowercase())
}
