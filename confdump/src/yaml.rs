//! YAML rendering for dump files.
//!
//! Config collections are rendered in one shot after sorting by canonical
//! text. Table dumps go through [`YamlListWriter`], which appends one record
//! at a time so a table never has to be held in memory.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};

/// Canonical textual rendering of a record: compact JSON.
///
/// Object keys come out in sorted order because `serde_json::Map` is
/// ordered, so the rendering does not depend on how the record was built.
/// Renderers that keep a record's own field order produce different text
/// for the same record, so neither the sort order nor the YAML bodies are
/// byte-compatible with dumps made that way.
pub fn canonical_text(record: &Value) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

/// Sort records by their canonical text, byte-wise.
///
/// This is a textual order, not a semantic one: `{"id":10}` sorts before
/// `{"id":9}`.
pub fn sort_by_canonical_text(records: Vec<Value>) -> Result<Vec<Value>> {
    let mut keyed = records
        .into_iter()
        .map(|record| canonical_text(&record).map(|key| (key, record)))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

/// Render a list of records as a single YAML document holding a sequence.
pub fn serialize_list<T: Serialize>(records: &[T]) -> Result<String> {
    Ok(serde_yaml::to_string(records)?)
}

/// Incremental writer for a YAML sequence.
///
/// Each [`append`](Self::append) emits one `- ...` item straight to the
/// underlying writer. [`close`](Self::close) must be called to flush; a list
/// with no items is finalized as `[]`.
pub struct YamlListWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> YamlListWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Append one record as the next sequence item.
    pub fn append<T: Serialize>(&mut self, record: &T) -> Result<()> {
        serde_yaml::to_writer(&mut self.inner, std::slice::from_ref(record))?;
        self.written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// Finalize the sequence and flush. Returns the number of records written.
    pub fn close(mut self) -> io::Result<u64> {
        if self.written == 0 {
            self.inner.write_all(b"[]\n")?;
        }
        self.inner.flush()?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_text_is_compact_with_sorted_keys() {
        let record = json!({"name": "pg", "config": {"port": 5432, "host": "db"}});
        assert_eq!(
            canonical_text(&record).unwrap(),
            r#"{"config":{"host":"db","port":5432},"name":"pg"}"#
        );
    }

    #[test]
    fn test_canonical_text_ignores_field_order() {
        let mut record = serde_json::Map::new();
        record.insert("b".to_string(), json!(1));
        record.insert("a".to_string(), json!(2));
        assert_eq!(
            canonical_text(&Value::Object(record)).unwrap(),
            r#"{"a":2,"b":1}"#
        );
    }

    #[test]
    fn test_sort_is_textual_not_numeric() {
        let sorted = sort_by_canonical_text(vec![json!({"id": 9}), json!({"id": 10})]).unwrap();
        assert_eq!(sorted, vec![json!({"id": 10}), json!({"id": 9})]);
    }

    #[test]
    fn test_sort_ignores_input_order() {
        let a = sort_by_canonical_text(vec![json!({"b": 1}), json!({"a": 2}), json!("x")]).unwrap();
        let b = sort_by_canonical_text(vec![json!("x"), json!({"a": 2}), json!({"b": 1})]).unwrap();
        assert_eq!(a, b);
        // '"' (0x22) sorts before '{' (0x7b)
        assert_eq!(a[0], json!("x"));
    }

    #[test]
    fn test_serialize_list_is_a_sequence() {
        let yaml = serialize_list(&[json!({"a": 1}), json!({"b": 2})]).unwrap();
        assert_eq!(yaml, "- a: 1\n- b: 2\n");

        let parsed: Vec<Value> = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_list_writer_appends_items() {
        let mut buf = Vec::new();
        let mut writer = YamlListWriter::new(&mut buf);
        writer.append(&json!({"id": 1, "status": "succeeded"})).unwrap();
        writer.append(&json!({"id": 2, "status": "failed"})).unwrap();
        writer.append(&json!(null)).unwrap();
        assert_eq!(writer.records_written(), 3);
        assert_eq!(writer.close().unwrap(), 3);

        let parsed: Vec<Value> = serde_yaml::from_slice(&buf).unwrap();
        assert_eq!(
            parsed,
            vec![
                json!({"id": 1, "status": "succeeded"}),
                json!({"id": 2, "status": "failed"}),
                json!(null),
            ]
        );
    }

    #[test]
    fn test_list_writer_matches_one_shot_rendering() {
        let records = vec![json!({"a": [1, 2]}), json!({"b": {"c": "d"}})];
        let mut buf = Vec::new();
        let mut writer = YamlListWriter::new(&mut buf);
        for record in &records {
            writer.append(record).unwrap();
        }
        writer.close().unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), serialize_list(&records).unwrap());
    }

    #[test]
    fn test_empty_list_writer_emits_empty_sequence() {
        let mut buf = Vec::new();
        let writer = YamlListWriter::new(&mut buf);
        assert_eq!(writer.close().unwrap(), 0);
        assert_eq!(buf, b"[]\n");

        let parsed: Vec<Value> = serde_yaml::from_slice(&buf).unwrap();
        assert!(parsed.is_empty());
    }
}
