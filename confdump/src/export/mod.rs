//! Config dump export.
//!
//! A dump runs three writers against a fresh temporary directory, in order:
//! - `VERSION`: the exporter version string
//! - `airbyte_config/`: one sorted YAML file per config collection
//! - `airbyte_db/`: one streamed YAML file per database table
//!
//! The directory is then packed into a `.tar.zst` archive and removed.

pub mod configs;
pub mod database;
pub mod types;

pub use configs::{dump_configs, write_configs, ConfigDumpStats};
pub use database::{dump_database, stream_table, write_table, DatabaseDumpStats};
pub use types::DumpArchive;

use crate::archive::{Archiver, TarZstArchiver};
use crate::error::{DumpError, Result};
use crate::layout::{build_version_path, ARCHIVE_EXTENSION, ARCHIVE_FILE_NAME, CONFIG_FOLDER_NAME};
use crate::source::{ConfigStore, JobPersistence};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// One dump job over a config store and a job database.
pub struct ConfigDumpExport<'a> {
    config_store: &'a dyn ConfigStore,
    persistence: &'a dyn JobPersistence,
    archiver: Box<dyn Archiver + 'a>,
    version: String,
    work_dir: PathBuf,
    archive_dir: PathBuf,
}

impl<'a> ConfigDumpExport<'a> {
    pub fn new(
        config_store: &'a dyn ConfigStore,
        persistence: &'a dyn JobPersistence,
        version: impl Into<String>,
    ) -> Self {
        Self {
            config_store,
            persistence,
            archiver: Box::new(TarZstArchiver::default()),
            version: version.into(),
            work_dir: std::env::temp_dir(),
            archive_dir: std::env::temp_dir(),
        }
    }

    pub fn with_archiver(mut self, archiver: impl Archiver + 'a) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    /// Parent directory for the temporary working directory.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Directory that receives the archive created by [`dump`](Self::dump).
    pub fn with_archive_dir(mut self, archive_dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = archive_dir.into();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Dump into a new temporary archive file and return it.
    ///
    /// The archive file is kept only once the dump and its checksum succeed.
    pub fn dump(&self) -> Result<DumpArchive> {
        let archive = tempfile::Builder::new()
            .prefix(ARCHIVE_FILE_NAME)
            .suffix(ARCHIVE_EXTENSION)
            .tempfile_in(&self.archive_dir)
            .map_err(|e| DumpError::fs(&self.archive_dir, e))?;

        let stats = self.export_into(archive.path())?;
        let (size_bytes, checksum) = fingerprint(archive.path())?;

        let (_, path) = archive
            .keep()
            .map_err(|e| DumpError::Archive(format!("Cannot keep archive file: {}", e)))?;
        Ok(self.describe(path, stats, size_bytes, checksum))
    }

    /// Dump into the archive at `output`, replacing any existing file.
    ///
    /// The archive is built next to `output` and renamed over it on success,
    /// so a failed dump leaves `output` untouched.
    pub fn dump_to(&self, output: &Path) -> Result<DumpArchive> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let archive = tempfile::Builder::new()
            .prefix(ARCHIVE_FILE_NAME)
            .suffix(ARCHIVE_EXTENSION)
            .tempfile_in(dir)
            .map_err(|e| DumpError::fs(dir, e))?;

        let stats = self.export_into(archive.path())?;
        let (size_bytes, checksum) = fingerprint(archive.path())?;

        archive
            .persist(output)
            .map_err(|e| DumpError::fs(output, e.error))?;
        Ok(self.describe(output.to_path_buf(), stats, size_bytes, checksum))
    }

    fn export_into(&self, destination: &Path) -> Result<DumpStats> {
        let temp_dir = tempfile::Builder::new()
            .prefix(ARCHIVE_FILE_NAME)
            .tempdir_in(&self.work_dir)
            .map_err(|e| DumpError::fs(&self.work_dir, e))?;
        let root = temp_dir.path().to_path_buf();

        tracing::info!("Dumping version {} into {:?}", self.version, root);

        write_version_file(&root, &self.version)?;

        let config_dir = root.join(CONFIG_FOLDER_NAME);
        fs::create_dir_all(&config_dir).map_err(|e| DumpError::fs(&config_dir, e))?;
        let configs = dump_configs(&root, self.config_store)?;
        tracing::info!(
            "Dumped {} config collections ({} records)",
            configs.collections,
            configs.records
        );

        let database = dump_database(&root, self.persistence)?;
        tracing::info!(
            "Dumped {} database tables ({} records)",
            database.tables,
            database.records
        );

        self.archiver.create_archive(&root, destination)?;
        tracing::info!("Archive written to {:?}", destination);

        temp_dir.close().map_err(|e| DumpError::fs(&root, e))?;

        Ok(DumpStats { configs, database })
    }

    fn describe(
        &self,
        path: PathBuf,
        stats: DumpStats,
        size_bytes: u64,
        checksum: String,
    ) -> DumpArchive {
        DumpArchive {
            path,
            version: self.version.clone(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            collections: stats.configs.collections,
            config_records: stats.configs.records,
            tables: stats.database.tables,
            table_records: stats.database.records,
            size_bytes,
            checksum,
        }
    }
}

/// Size and SHA-256 of an archive file.
fn fingerprint(path: &Path) -> Result<(u64, String)> {
    let mut file = File::open(path).map_err(|e| DumpError::fs(path, e))?;
    let size_bytes = file.metadata().map_err(|e| DumpError::fs(path, e))?.len();

    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| DumpError::fs(path, e))?;

    Ok((size_bytes, hex::encode(hasher.finalize())))
}

struct DumpStats {
    configs: ConfigDumpStats,
    database: DatabaseDumpStats,
}

/// Write `VERSION` into `root`. Fails if the file already exists.
pub fn write_version_file(root: &Path, version: &str) -> Result<()> {
    let path = build_version_path(root);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| DumpError::fs(&path, e))?;
    file.write_all(version.as_bytes())
        .map_err(|e| DumpError::fs(&path, e))
}

pub(crate) fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| DumpError::fs(parent, e)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_version_file_is_exact() {
        let temp = TempDir::new().unwrap();
        write_version_file(temp.path(), "0.32.0-alpha").unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join("VERSION")).unwrap(),
            "0.32.0-alpha"
        );
    }

    #[test]
    fn test_version_file_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        write_version_file(temp.path(), "0.32.0-alpha").unwrap();
        let err = write_version_file(temp.path(), "0.33.0").unwrap_err();
        assert!(err.is_filesystem());
        assert_eq!(
            fs::read_to_string(temp.path().join("VERSION")).unwrap(),
            "0.32.0-alpha"
        );
    }

    #[test]
    fn test_version_file_in_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let err = write_version_file(&temp.path().join("missing"), "1").unwrap_err();
        assert!(err.is_filesystem());
    }
}
