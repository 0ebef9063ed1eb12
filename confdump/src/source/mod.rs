//! Data sources read by a dump.
//!
//! - [`ConfigStore`]: named collections of fully materialized config records
//! - [`JobPersistence`]: database tables exposed as lazy record streams

pub mod file_store;
pub mod sqlite;

pub use file_store::FileConfigStore;
pub use sqlite::SqlitePersistence;

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// Lazy, single-use stream of records from one table.
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Value>> + 'a>;

/// Storage holding configuration collections.
pub trait ConfigStore {
    /// Names of all collections, in store order.
    fn list_collections(&self) -> Result<Vec<String>>;

    /// All records in a collection.
    fn list_records(&self, collection: &str) -> Result<Vec<Value>>;
}

/// Relational persistence holding job tables.
pub trait JobPersistence {
    /// One record stream per table in the default schema, keyed by table name.
    fn export_default_schema(&self) -> Result<BTreeMap<String, RecordStream<'_>>>;
}
