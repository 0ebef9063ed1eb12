//! confdump: export configuration collections and job database tables to a
//! single YAML archive.

pub mod archive;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod source;
pub mod yaml;

pub use archive::{Archiver, TarZstArchiver};
pub use config::Config;
pub use error::{DumpError, Result};
pub use export::{ConfigDumpExport, DumpArchive};
pub use source::{ConfigStore, FileConfigStore, JobPersistence, RecordStream, SqlitePersistence};
