//! Archive creation for dump directories.
//!
//! A dump is packed as a zstd-compressed tar archive (`.tar.zst`). Entry
//! paths are relative to the dump directory and are added in sorted order.

use crate::error::{DumpError, Result};
use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

/// Default zstd compression level.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Packs a directory tree into a single archive file.
pub trait Archiver {
    fn create_archive(&self, source_dir: &Path, destination: &Path) -> Result<()>;
}

/// Tar archive compressed with zstd.
#[derive(Debug, Clone)]
pub struct TarZstArchiver {
    level: i32,
}

impl TarZstArchiver {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for TarZstArchiver {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Archiver for TarZstArchiver {
    fn create_archive(&self, source_dir: &Path, destination: &Path) -> Result<()> {
        let output_file = File::create(destination)
            .map_err(|e| DumpError::Archive(format!("Cannot create output file: {}", e)))?;

        let encoder = zstd::stream::Encoder::new(output_file, self.level)
            .map_err(|e| DumpError::Archive(format!("Zstd encoder creation failed: {}", e)))?;

        let mut archive = tar::Builder::new(encoder);
        add_directory_to_archive(&mut archive, source_dir, None)?;

        let encoder = archive
            .into_inner()
            .map_err(|e| DumpError::Archive(format!("Archive finalization failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| DumpError::Archive(format!("Zstd finalization failed: {}", e)))?
            .sync_all()
            .map_err(|e| DumpError::Archive(format!("Archive sync failed: {}", e)))?;

        Ok(())
    }
}

/// One entry of a produced archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub size: u64,
    pub is_dir: bool,
}

/// List the entries of a `.tar.zst` archive in stored order.
pub fn list_entries(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
    let input_file = File::open(archive_path)
        .map_err(|e| DumpError::Archive(format!("Cannot open archive: {}", e)))?;
    let decoder = zstd::stream::Decoder::new(BufReader::new(input_file))
        .map_err(|e| DumpError::Archive(format!("Zstd decoder creation failed: {}", e)))?;
    let mut archive = tar::Archive::new(decoder);

    let mut entries = Vec::new();
    for entry_result in archive
        .entries()
        .map_err(|e| DumpError::Archive(format!("Cannot read entries: {}", e)))?
    {
        let entry =
            entry_result.map_err(|e| DumpError::Archive(format!("Entry read failed: {}", e)))?;
        let path = entry
            .path()
            .map_err(|e| DumpError::Archive(format!("Path read failed: {}", e)))?
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();

        entries.push(ArchiveEntry {
            path,
            size: entry.header().size().unwrap_or(0),
            is_dir: entry.header().entry_type().is_dir(),
        });
    }

    Ok(entries)
}

/// Add a file to a tar archive.
fn add_file_to_archive<W: Write>(
    archive: &mut tar::Builder<W>,
    file_path: &Path,
    archive_path: &str,
) -> Result<()> {
    let mut file =
        File::open(file_path).map_err(|e| DumpError::fs(file_path, e))?;
    let metadata = file.metadata().map_err(|e| DumpError::fs(file_path, e))?;

    let mut header = tar::Header::new_gnu();
    header
        .set_path(archive_path)
        .map_err(|e| DumpError::Archive(format!("Path error: {}", e)))?;
    header.set_size(metadata.len());
    header.set_mode(0o644);
    header.set_mtime(
        metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs())
            .unwrap_or(0),
    );
    header.set_cksum();

    archive
        .append(&header, &mut file)
        .map_err(|e| DumpError::Archive(format!("Archive append failed: {}", e)))?;

    Ok(())
}

/// Add a directory's contents to a tar archive recursively, in name order.
fn add_directory_to_archive<W: Write>(
    archive: &mut tar::Builder<W>,
    dir_path: &Path,
    archive_prefix: Option<&str>,
) -> Result<()> {
    let mut entries = fs::read_dir(dir_path)
        .map_err(|e| DumpError::fs(dir_path, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| DumpError::fs(dir_path, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        let archive_path = match archive_prefix {
            Some(prefix) => format!("{}/{}", prefix, name.to_string_lossy()),
            None => name.to_string_lossy().into_owned(),
        };

        if path.is_file() {
            add_file_to_archive(archive, &path, &archive_path)?;
        } else if path.is_dir() {
            archive
                .append_dir(&archive_path, &path)
                .map_err(|e| DumpError::Archive(format!("Archive append failed: {}", e)))?;
            add_directory_to_archive(archive, &path, Some(&archive_path))?;
        }
    }

    Ok(())
}
