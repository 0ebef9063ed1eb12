//! Database table serializer.
//!
//! Tables are streamed record by record in producer order. Nothing is
//! sorted, so memory stays bounded regardless of table size.

use crate::error::{DumpError, Result};
use crate::layout::{build_table_path, DB_FOLDER_NAME};
use crate::source::{JobPersistence, RecordStream};
use crate::yaml::YamlListWriter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::create_parent;

/// Totals of a database dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseDumpStats {
    pub tables: usize,
    pub records: u64,
}

/// Write every table of the default schema under `<root>/airbyte_db/`.
pub fn dump_database(root: &Path, persistence: &dyn JobPersistence) -> Result<DatabaseDumpStats> {
    let tables = persistence.export_default_schema()?;
    let db_dir = root.join(DB_FOLDER_NAME);
    fs::create_dir_all(&db_dir).map_err(|e| DumpError::fs(&db_dir, e))?;

    let mut stats = DatabaseDumpStats::default();
    for (table, rows) in tables {
        let path = build_table_path(root, &table);
        let count = write_table(&path, rows)?;

        tracing::debug!("Dumped table '{}' ({} records)", table, count);
        stats.tables += 1;
        stats.records += count;
    }

    Ok(stats)
}

/// Stream one table into the YAML file at `path`.
pub fn write_table(path: &Path, rows: RecordStream<'_>) -> Result<u64> {
    create_parent(path)?;
    let file = File::create(path).map_err(|e| DumpError::fs(path, e))?;
    stream_table(rows, BufWriter::new(file), path)
}

/// Append each record of `rows` to `out` as a YAML sequence item.
///
/// The writer is finalized even when the stream or a write fails; the first
/// error is returned. `path` is only used to label I/O errors.
pub fn stream_table<W: Write>(mut rows: RecordStream<'_>, out: W, path: &Path) -> Result<u64> {
    let mut writer = YamlListWriter::new(out);
    let streamed = rows.try_for_each(|row| writer.append(&row?));
    let closed = writer.close().map_err(|e| DumpError::fs(path, e));

    streamed?;
    closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn stream(records: Vec<Result<Value>>) -> RecordStream<'static> {
        Box::new(records.into_iter())
    }

    #[test]
    fn test_write_table_in_producer_order() {
        let temp = TempDir::new().unwrap();
        let path = build_table_path(temp.path(), "jobs");
        let count = write_table(
            &path,
            stream(vec![Ok(json!({"id": 3})), Ok(json!({"id": 1})), Ok(json!({"id": 2}))]),
        )
        .unwrap();

        assert_eq!(count, 3);
        let content = fs::read_to_string(temp.path().join("airbyte_db/JOBS.yaml")).unwrap();
        assert_eq!(content, "- id: 3\n- id: 1\n- id: 2\n");
    }

    #[test]
    fn test_failed_stream_still_flushes_written_records() {
        let temp = TempDir::new().unwrap();
        let path = build_table_path(temp.path(), "attempts");
        let err = write_table(
            &path,
            stream(vec![
                Ok(json!({"id": 1})),
                Err(DumpError::StorageRead("connection reset".to_string())),
                Ok(json!({"id": 2})),
            ]),
        )
        .unwrap_err();

        assert!(err.is_storage_read());
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "- id: 1\n");
    }

    #[test]
    fn test_empty_table_is_empty_sequence() {
        let temp = TempDir::new().unwrap();
        let path = build_table_path(temp.path(), "airbyte_metadata");
        assert_eq!(write_table(&path, stream(Vec::new())).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
