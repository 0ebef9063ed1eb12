//! Dump result types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A finished dump archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpArchive {
    /// Location of the `.tar.zst` file
    pub path: PathBuf,
    /// Version written to `VERSION`
    pub version: String,
    /// Export timestamp (RFC 3339)
    pub exported_at: String,
    /// Number of config collections written
    pub collections: usize,
    pub config_records: u64,
    /// Number of database tables written
    pub tables: usize,
    pub table_records: u64,
    /// Archive size in bytes
    pub size_bytes: u64,
    /// SHA-256 of the archive file
    pub checksum: String,
}
