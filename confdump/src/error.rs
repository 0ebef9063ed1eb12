use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Storage read error: {0}")]
    StorageRead(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Filesystem error at {path:?}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Archive error: {0}")]
    Archive(String),
}

impl DumpError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn fs(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        DumpError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True for failures reading from the config store or job database.
    pub fn is_storage_read(&self) -> bool {
        matches!(self, DumpError::StorageRead(_) | DumpError::Sqlite(_))
    }

    pub fn is_filesystem(&self) -> bool {
        matches!(self, DumpError::Filesystem { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(
            self,
            DumpError::Yaml(_) | DumpError::Json(_) | DumpError::Serialization(_)
        )
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, DumpError::Archive(_))
    }
}

pub type Result<T> = std::result::Result<T, DumpError>;
