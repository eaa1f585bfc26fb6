// file: src/exporter/json.rs
// description: records search service responses as json files

use crate::error::{DemoError, Result};
use crate::models::Document;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Input file a recorded run was produced from.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportedSource {
    pub tracking_id: String,
    pub path: String,
    pub content_hash: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub sources: Vec<ExportedSource>,
    pub files: Vec<String>,
}

#[derive(Debug, Default)]
struct ExportState {
    sources: Vec<ExportedSource>,
    files: Vec<String>,
}

#[derive(Debug)]
pub struct ResponseExporter {
    output_dir: PathBuf,
    pretty: bool,
    state: Mutex<ExportState>,
}

impl ResponseExporter {
    pub fn new(output_dir: impl Into<PathBuf>, pretty: bool) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| DemoError::FileOperation {
            path: output_dir.clone(),
            source,
        })?;

        Ok(Self {
            output_dir,
            pretty,
            state: Mutex::new(ExportState::default()),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn add_source(&self, document: &Document) {
        self.state().sources.push(ExportedSource {
            tracking_id: document.tracking_id.clone(),
            path: document.source_path.display().to_string(),
            content_hash: document.content_hash.clone(),
            word_count: document.word_count(),
        });
    }

    /// Writes `response` to `<step>.json`, prefixed with its order in the run.
    pub fn record(&self, step: &str, response: &Value) -> Result<PathBuf> {
        let mut state = self.state();

        let file_name = format!("{:02}_{}.json", state.files.len() + 1, step);
        let path = self.output_dir.join(&file_name);
        self.write_json(&path, response)?;

        debug!("Recorded {} response to {}", step, path.display());
        state.files.push(file_name);
        Ok(path)
    }

    pub fn write_manifest(&self) -> Result<ExportManifest> {
        let manifest = {
            let state = self.state();
            ExportManifest {
                exported_at: Utc::now().to_rfc3339(),
                sources: state.sources.clone(),
                files: state.files.clone(),
            }
        };

        let path = self.output_dir.join("manifest.json");
        self.write_json(&path, &manifest)?;

        info!(
            "Export complete: {} responses written to {}",
            manifest.files.len(),
            self.output_dir.display()
        );
        Ok(manifest)
    }

    // State is append-only, so the data behind a poisoned lock is still consistent.
    fn state(&self) -> MutexGuard<'_, ExportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };

        fs::write(path, content).map_err(|source| DemoError::FileOperation {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_exporter_creation() {
        let dir = tempdir().unwrap();
        let exporter = ResponseExporter::new(dir.path().join("nested"), true).unwrap();
        assert!(exporter.output_dir().is_dir());
    }

    #[test]
    fn test_record_numbers_files_in_order() {
        let dir = tempdir().unwrap();
        let exporter = ResponseExporter::new(dir.path(), false).unwrap();

        let first = exporter.record("chunk_search", &json!({"score_chunks": []})).unwrap();
        let second = exporter.record("chunk_recommend", &json!([])).unwrap();

        assert!(first.ends_with("01_chunk_search.json"));
        assert!(second.ends_with("02_chunk_recommend.json"));

        let written: Value = serde_json::from_str(&fs::read_to_string(first).unwrap()).unwrap();
        assert_eq!(written, json!({"score_chunks": []}));
    }

    #[test]
    fn test_manifest_lists_recorded_files() {
        let dir = tempdir().unwrap();
        let exporter = ResponseExporter::new(dir.path(), true).unwrap();
        exporter.record("group_search", &Value::Null).unwrap();

        let manifest = exporter.write_manifest().unwrap();
        assert_eq!(manifest.files, vec!["01_group_search.json".to_string()]);
        assert!(dir.path().join("manifest.json").exists());
    }

    #[test]
    fn test_manifest_traces_source_documents() {
        let dir = tempdir().unwrap();
        let exporter = ResponseExporter::new(dir.path(), false).unwrap();
        let document = Document::new(
            1,
            PathBuf::from("tax_relief_for_american_families_act.txt"),
            "tax relief for families".to_string(),
        );
        exporter.add_source(&document);

        exporter.write_manifest().unwrap();
        let written: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("manifest.json")).unwrap())
                .unwrap();

        assert_eq!(written["sources"][0]["tracking_id"], json!("1"));
        assert_eq!(
            written["sources"][0]["content_hash"],
            json!(document.content_hash)
        );
        assert_eq!(written["sources"][0]["word_count"], json!(4));
    }

    #[test]
    fn test_poisoned_lock_keeps_recording() {
        let dir = tempdir().unwrap();
        let exporter = ResponseExporter::new(dir.path(), false).unwrap();
        exporter.record("chunk_search", &Value::Null).unwrap();

        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = exporter.state.lock().unwrap();
                    panic!("writer panicked while holding the lock");
                })
                .join();
        });
        assert!(exporter.state.is_poisoned());

        let path = exporter.record("chunk_recommend", &Value::Null).unwrap();
        assert!(path.ends_with("02_chunk_recommend.json"));
        assert_eq!(exporter.write_manifest().unwrap().files.len(), 2);
    }
}
