//! Config collection serializer.
//!
//! Each collection is fully materialized, sorted by canonical text and
//! written as one YAML sequence. Empty collections become zero-byte files.

use crate::error::{DumpError, Result};
use crate::layout::build_config_path;
use crate::source::ConfigStore;
use crate::yaml::{serialize_list, sort_by_canonical_text};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::path::Path;

use super::create_parent;

/// Totals of a config dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigDumpStats {
    pub collections: usize,
    pub records: u64,
}

/// Write every collection of `store` under `<root>/airbyte_config/`.
pub fn dump_configs(root: &Path, store: &dyn ConfigStore) -> Result<ConfigDumpStats> {
    let mut stats = ConfigDumpStats::default();

    for collection in store.list_collections()? {
        let records = store.list_records(&collection)?;
        let count = records.len() as u64;
        write_configs(root, &collection, records)?;

        tracing::debug!("Dumped config collection '{}' ({} records)", collection, count);
        stats.collections += 1;
        stats.records += count;
    }

    Ok(stats)
}

/// Write one collection to its YAML file.
pub fn write_configs(root: &Path, collection: &str, records: Vec<Value>) -> Result<()> {
    let path = build_config_path(root, collection);
    create_parent(&path)?;

    if records.is_empty() {
        // Empty file marks a collection that exists but has no records
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| DumpError::fs(&path, e))?;
        return Ok(());
    }

    let sorted = sort_by_canonical_text(records)?;
    let yaml = serialize_list(&sorted)?;
    fs::write(&path, yaml).map_err(|e| DumpError::fs(&path, e))
}
