//! On-disk layout of a dump.
//!
//! ```text
//! VERSION
//! airbyte_config/<collection>.yaml
//! airbyte_db/<TABLE>.yaml
//! ```

use std::path::{Path, PathBuf};

/// Prefix for the temporary working directory and archive file.
pub const ARCHIVE_FILE_NAME: &str = "airbyte_config_dump";
/// Extension of the produced archive.
pub const ARCHIVE_EXTENSION: &str = ".tar.zst";
pub const CONFIG_FOLDER_NAME: &str = "airbyte_config";
pub const DB_FOLDER_NAME: &str = "airbyte_db";
pub const VERSION_FILE_NAME: &str = "VERSION";

/// Path of the YAML file holding a config collection. The name is used verbatim.
pub fn build_config_path(root: &Path, collection: &str) -> PathBuf {
    root.join(CONFIG_FOLDER_NAME)
        .join(format!("{}.yaml", collection))
}

/// Path of the YAML file holding a database table. The name is upper-cased.
pub fn build_table_path(root: &Path, table: &str) -> PathBuf {
    root.join(DB_FOLDER_NAME)
        .join(format!("{}.yaml", table.to_uppercase()))
}

pub fn build_version_path(root: &Path) -> PathBuf {
    root.join(VERSION_FILE_NAME)
}
