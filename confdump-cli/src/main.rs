use anyhow::Result;
use clap::{Parser, Subcommand};
use confdump::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "confdump")]
#[command(about = "Export configuration and job database to a YAML archive")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.confdump/config.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dump configs and database tables into a .tar.zst archive
    Dump {
        /// Output archive path (default: a new temporary file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Version written to VERSION (overrides config)
        #[arg(long = "dump-version")]
        dump_version: Option<String>,

        /// Config store root directory (overrides config)
        #[arg(long)]
        config_root: Option<PathBuf>,

        /// SQLite job database (overrides config)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// List the entries of a dump archive
    Inspect {
        /// Archive to inspect
        archive: PathBuf,
    },

    /// Write a default config file
    Init {
        /// Where to write the config (default: ~/.confdump/config.toml)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(config: &Config) -> Result<()> {
    let log_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if let Some(log_file) = &config.logging.file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        tracing_subscriber::fmt()
            .with_env_filter(log_filter)
            .with_writer(file)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    init_logging(&config)?;

    match cli.command {
        Commands::Dump {
            output,
            dump_version,
            config_root,
            database,
        } => {
            if let Some(version) = dump_version {
                config.export.version = version;
            }
            if let Some(root) = config_root {
                config.storage.config_root = root;
            }
            if let Some(db) = database {
                config.database.path = db;
            }
            commands::run_dump(&config, output)?;
        }
        Commands::Inspect { archive } => {
            commands::run_inspect(&archive)?;
        }
        Commands::Init { path, force } => {
            let path = path
                .or(cli.config)
                .unwrap_or_else(Config::default_path);
            commands::run_init(&path, force)?;
        }
    }

    Ok(())
}
