pub mod document_walk;
pub mod file_size;

pub use document_walk::collect_documents;
pub use file_size::FileSizeUtils;
