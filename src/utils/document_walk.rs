use ignore::Walk;
use std::path::{Path, PathBuf};

use crate::upload::is_supported_name;

/// Expands directories into the analyzable documents they contain, honouring
/// `.gitignore`. Plain file paths are passed through untouched so the
/// validator can reject them with a proper message.
pub fn collect_documents(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut documents = Vec::new();

    for path in paths {
        if !path.is_dir() {
            documents.push(path.clone());
            continue;
        }

        for entry in Walk::new(path).flatten() {
            let entry_path = entry.path();
            if entry_path.is_file() && is_document(entry_path) {
                documents.push(entry_path.to_path_buf());
            }
        }
    }

    documents
}

fn is_document(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(is_supported_name)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn expands_directories_to_supported_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nda.pdf"), b"pdf").unwrap();
        fs::write(dir.path().join("notes.txt"), b"txt").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        fs::write(dir.path().join("archive").join("lease.DOCX"), b"docx").unwrap();

        let mut found = collect_documents(&[dir.path().to_path_buf()]);
        found.sort();

        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"nda.pdf".to_string()));
        assert!(names.contains(&"lease.DOCX".to_string()));
    }

    #[test]
    fn plain_files_pass_through() {
        let paths = [PathBuf::from("/does/not/exist.txt")];
        assert_eq!(collect_documents(&paths), paths);
    }
}
