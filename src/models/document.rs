// file: src/models/document.rs
// description: bill document model loaded from disk
// reference: internal data structures

use crate::error::{DemoError, Result};
use crate::utils::validation::Validator;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Position in the configured document list, used as the service-side tracking id
    pub tracking_id: String,
    pub source_path: PathBuf,
    pub content: String,
    pub content_hash: String,
}

impl Document {
    pub fn new(index: usize, source_path: PathBuf, content: String) -> Self {
        let content_hash = Self::compute_hash(&content);

        Self {
            tracking_id: index.to_string(),
            source_path,
            content,
            content_hash,
        }
    }

    pub fn from_file(index: usize, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DemoError::FileOperation {
            path: path.to_path_buf(),
            source,
        })?;

        Validator::validate_content_not_empty(&content)?;

        Ok(Self::new(index, path.to_path_buf(), content))
    }

    /// Loads every path in order; tracking ids follow list position.
    pub fn load_all(paths: &[PathBuf]) -> Result<Vec<Self>> {
        paths
            .iter()
            .enumerate()
            .map(|(index, path)| Self::from_file(index, path))
            .collect()
    }

    /// Human readable name derived from the file stem, e.g. `secure the border act`.
    pub fn title(&self) -> Option<String> {
        let stem = self.source_path.file_stem()?.to_str()?;
        let title = stem.replace(['_', '-'], " ").trim().to_string();
        (!title.is_empty()).then_some(title)
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    fn compute_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_document_creation() {
        let doc = Document::new(
            1,
            PathBuf::from("tax_relief.txt"),
            "An Act to amend the Internal Revenue Code".to_string(),
        );

        assert_eq!(doc.tracking_id, "1");
        assert_eq!(doc.title().as_deref(), Some("tax relief"));
        assert_eq!(doc.word_count(), 8);
        assert_eq!(doc.content_hash.len(), 64);
    }

    #[test]
    fn test_hash_consistency() {
        let content = "Test content";
        assert_eq!(Document::compute_hash(content), Document::compute_hash(content));
    }

    #[test]
    fn test_load_all_assigns_positions() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::File::create(&first).unwrap().write_all(b"border security").unwrap();
        fs::File::create(&second).unwrap().write_all(b"tax relief").unwrap();

        let docs = Document::load_all(&[first, second]).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].tracking_id, "0");
        assert_eq!(docs[1].tracking_id, "1");
        assert_eq!(docs[1].content, "tax relief");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Document::from_file(0, Path::new("/nonexistent/bill.txt")).unwrap_err();
        match err {
            DemoError::FileOperation { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/bill.txt"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "  \n").unwrap();
        assert!(Document::from_file(0, &path).is_err());
    }
}
