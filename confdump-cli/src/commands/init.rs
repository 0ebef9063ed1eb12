use anyhow::Result;
use confdump::Config;
use std::path::Path;

/// Write a default config file.
pub fn run_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("Config already exists at {:?} (use --force to overwrite)", path);
    }

    Config::default().save(path)?;
    tracing::info!("Wrote default config to {:?}", path);
    println!("Config written to {}", path.display());

    Ok(())
}
