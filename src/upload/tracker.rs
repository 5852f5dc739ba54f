use tracing::debug;

use crate::upload::types::{FileStatus, RecordId, UploadedFileRecord};
use crate::upload::validator::AcceptedFile;

/// Ordered collection of upload records. Insertion order is display order.
#[derive(Debug, Default)]
pub struct UploadTracker {
    records: Vec<UploadedFileRecord>,
    next_id: u64,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, file: &AcceptedFile) -> RecordId {
        self.next_id += 1;
        let id = RecordId(self.next_id);

        self.records.push(UploadedFileRecord {
            id,
            name: file.name().to_string(),
            size_bytes: file.size_bytes(),
            progress: 0,
            status: FileStatus::Uploading,
        });

        id
    }

    /// Returns false when the record is gone or already terminal.
    pub fn update_status(&mut self, id: RecordId, status: FileStatus) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            debug!("Ignoring status update for removed record {}", id);
            return false;
        };

        if record.status.is_terminal() {
            debug!(
                "Ignoring {} update for {}, already {}",
                status.label(),
                id,
                record.status.label()
            );
            return false;
        }

        if status == FileStatus::Complete {
            record.progress = 100;
        }
        record.status = status;
        true
    }

    pub fn remove_record(&mut self, id: RecordId) -> Option<UploadedFileRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn clear_all(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, id: RecordId) -> Option<&UploadedFileRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[UploadedFileRecord] {
        &self.records
    }

    /// Owned copy for views that mutate the tracker while iterating.
    pub fn snapshot(&self) -> Vec<UploadedFileRecord> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
