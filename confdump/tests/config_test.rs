//! Tests for config module

use confdump::config::{expand_tilde, Config};
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.export.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(config.export.compression_level, 3);
    assert_eq!(config.database.page_size, 500);
    assert!(config.storage.config_root.ends_with(".confdump/config"));
    assert!(config.database.path.ends_with(".confdump/jobs.db"));
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
}

#[test]
fn test_expand_tilde() {
    let home = dirs::home_dir().unwrap();

    let expanded = expand_tilde(&PathBuf::from("~/foo")).unwrap();
    assert_eq!(expanded, home.join("foo"));

    let expanded = expand_tilde(&PathBuf::from("~")).unwrap();
    assert_eq!(expanded, home);

    let expanded = expand_tilde(&PathBuf::from("/absolute/path")).unwrap();
    assert_eq!(expanded, PathBuf::from("/absolute/path"));

    let expanded = expand_tilde(&PathBuf::from("relative/path")).unwrap();
    assert_eq!(expanded, PathBuf::from("relative/path"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let temp = tempdir().unwrap();
    let config = Config::load_or_default(&temp.path().join("config.toml")).unwrap();
    assert_eq!(config.database.page_size, 500);
    assert!(!temp.path().join("config.toml").exists());
}

#[test]
fn test_load_from_missing_file_fails() {
    let temp = tempdir().unwrap();
    assert!(Config::load_from(&temp.path().join("config.toml")).is_err());
}

#[test]
fn test_save_and_load() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("nested/config.toml");

    let mut config = Config::default();
    config.export.version = "0.32.0-alpha".to_string();
    config.export.compression_level = 9;
    config.database.page_size = 50;
    config.logging.level = "debug".to_string();

    config.save(&config_path).unwrap();

    let loaded = Config::load_from(&config_path).unwrap();
    assert_eq!(loaded.export.version, "0.32.0-alpha");
    assert_eq!(loaded.export.compression_level, 9);
    assert_eq!(loaded.database.page_size, 50);
    assert_eq!(loaded.logging.level, "debug");
}

#[test]
fn test_parse_toml() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(
        &config_path,
        r#"
[export]
version = "0.40.0"
work_dir = "/var/tmp"

[storage]
config_root = "~/airbyte/config"

[database]
path = "/data/jobs.db"

[logging]
level = "warn"
file = "~/logs/confdump.log"
"#,
    )
    .unwrap();

    let home = dirs::home_dir().unwrap();
    let config = Config::load_from(&config_path).unwrap();
    assert_eq!(config.export.version, "0.40.0");
    assert_eq!(config.export.work_dir, PathBuf::from("/var/tmp"));
    assert_eq!(config.export.compression_level, 3);
    assert_eq!(config.storage.config_root, home.join("airbyte/config"));
    assert_eq!(config.database.path, PathBuf::from("/data/jobs.db"));
    assert_eq!(config.database.page_size, 500);
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.file, Some(home.join("logs/confdump.log")));
}

#[test]
fn test_invalid_toml_fails() {
    let temp = tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    std::fs::write(&config_path, "[export\nversion = ").unwrap();
    assert!(Config::load_from(&config_path).is_err());
}
