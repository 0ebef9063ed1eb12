use anyhow::{Context, Result};
use confdump::archive::list_entries;
use std::path::Path;

/// Run inspect command on a dump archive
pub fn run_inspect(archive: &Path) -> Result<()> {
    if !archive.exists() {
        anyhow::bail!("Archive not found at {:?}", archive);
    }

    let entries = list_entries(archive)
        .with_context(|| format!("Failed to read archive at {:?}", archive))?;

    let files = entries.iter().filter(|e| !e.is_dir).count();
    let total: u64 = entries.iter().map(|e| e.size).sum();

    println!();
    println!("Archive: {} ({} files, {} bytes uncompressed)", archive.display(), files, total);
    println!("--------------------------------------------------------------------------------");
    for entry in &entries {
        if entry.is_dir {
            println!("  {}/", entry.path);
        } else {
            println!("  {:<60} {:>12}", entry.path, entry.size);
        }
    }
    println!();

    Ok(())
}
