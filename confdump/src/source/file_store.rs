//! Directory-backed config store.
//!
//! Every subdirectory of the root is a collection; every `*.json` file inside
//! it is one record.

use super::ConfigStore;
use crate::error::{DumpError, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_record(path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).map_err(|e| DumpError::fs(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| DumpError::Serialization(format!("Invalid JSON in {:?}: {}", path, e)))
    }
}

impl ConfigStore for FileConfigStore {
    fn list_collections(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            tracing::debug!("Config root {:?} does not exist, no collections", self.root);
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| DumpError::fs(&self.root, e))? {
            let entry = entry.map_err(|e| DumpError::fs(&self.root, e))?;
            if entry.path().is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_records(&self, collection: &str) -> Result<Vec<Value>> {
        let dir = self.root.join(collection);
        if !dir.is_dir() {
            return Err(DumpError::StorageRead(format!(
                "Config collection not found: {}",
                collection
            )));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| DumpError::fs(&dir, e))? {
            let path = entry.map_err(|e| DumpError::fs(&dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        paths.iter().map(|path| Self::read_record(path)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_has_no_collections() {
        let temp = TempDir::new().unwrap();
        let store = FileConfigStore::new(temp.path().join("missing"));
        assert!(store.list_collections().unwrap().is_empty());
    }

    #[test]
    fn test_lists_directories_and_json_records() {
        let temp = TempDir::new().unwrap();
        let sources = temp.path().join("sources");
        fs::create_dir_all(&sources).unwrap();
        fs::create_dir_all(temp.path().join("destinations")).unwrap();
        fs::write(temp.path().join("stray.json"), "{}").unwrap();
        fs::write(sources.join("b.json"), r#"{"name": "b"}"#).unwrap();
        fs::write(sources.join("a.json"), r#"{"name": "a"}"#).unwrap();
        fs::write(sources.join("notes.txt"), "ignored").unwrap();

        let store = FileConfigStore::new(temp.path());
        assert_eq!(
            store.list_collections().unwrap(),
            vec!["destinations".to_string(), "sources".to_string()]
        );
        assert_eq!(
            store.list_records("sources").unwrap(),
            vec![json!({"name": "a"}), json!({"name": "b"})]
        );
        assert!(store.list_records("destinations").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_collection_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let store = FileConfigStore::new(temp.path());
        let err = store.list_records("nope").unwrap_err();
        assert!(err.is_storage_read());
    }

    #[test]
    fn test_bad_json_is_serialization_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("sources");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("broken.json"), "{not json").unwrap();

        let store = FileConfigStore::new(temp.path());
        let err = store.list_records("sources").unwrap_err();
        assert!(err.is_serialization());
    }
}
