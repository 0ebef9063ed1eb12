//! Dump command implementation.

use anyhow::{Context, Result};
use confdump::{Config, ConfigDumpExport, FileConfigStore, SqlitePersistence, TarZstArchiver};
use std::path::PathBuf;

/// Run the dump command.
pub fn run_dump(config: &Config, output: Option<PathBuf>) -> Result<()> {
    println!(
        "Dumping version {} from {}",
        config.export.version,
        config.storage.config_root.display()
    );

    let store = FileConfigStore::new(&config.storage.config_root);
    let persistence = SqlitePersistence::open(&config.database.path)
        .with_context(|| format!("Failed to open job database {:?}", config.database.path))?
        .with_page_size(config.database.page_size);

    let export = ConfigDumpExport::new(&store, &persistence, config.export.version.clone())
        .with_archiver(TarZstArchiver::new(config.export.compression_level))
        .with_work_dir(&config.export.work_dir);

    let archive = match output {
        Some(path) => export.dump_to(&path),
        None => export.dump(),
    }
    .context("Config dump failed")?;

    println!();
    println!(
        "Dumped {} collections ({} records) and {} tables ({} records)",
        archive.collections, archive.config_records, archive.tables, archive.table_records
    );
    println!("Archive:  {}", archive.path.display());
    println!("Size:     {} bytes", archive.size_bytes);
    println!("Checksum: {}", archive.checksum);

    Ok(())
}
