//! Integration tests for TOML configuration loading
//!
//! Tests cover:
//! - Explicit config files (present, missing, malformed)
//! - The optional default config location
//! - Merging the loaded file with command-line/environment overrides
//!
//! Note: Uses serial_test to prevent ENV variable races. Tests that
//! manipulate XDG_CONFIG_HOME are marked with #[serial].

use cuedeck_common::config::{
    default_config_path, load_toml_config, Overrides, ServerConfig, DEFAULT_PORT,
};
use cuedeck_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("Should write config file");
    path
}

#[test]
fn test_explicit_config_file_loaded() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        music_root = "/srv/theatre/music"
        port = 4100
        bind_address = "127.0.0.1"

        [logging]
        level = "debug"

        [session]
        ttl_secs = 3600
        secure_cookie = true
        "#,
    );

    let toml = load_toml_config(Some(path.as_path())).unwrap();
    assert_eq!(toml.music_root, Some(PathBuf::from("/srv/theatre/music")));
    assert_eq!(toml.port, Some(4100));
    assert_eq!(toml.logging.level, "debug");
    assert_eq!(toml.session.ttl_secs, 3600);
    assert_eq!(toml.session.secure_cookie, Some(true));
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = 4200\n");

    let toml = load_toml_config(Some(path.as_path())).unwrap();
    let config = ServerConfig::resolve(Overrides::default(), toml).unwrap();

    assert_eq!(config.port, 4200);
    assert_eq!(config.music_root, PathBuf::from("music"));
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_missing_explicit_config_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = load_toml_config(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_malformed_config_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "port = \"not a number\"\n");

    let err = load_toml_config(Some(path.as_path())).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_missing_default_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let toml = load_toml_config(None).unwrap();
    let config = ServerConfig::resolve(Overrides::default(), toml).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);

    env::remove_var("XDG_CONFIG_HOME");
}

#[test]
#[serial]
#[cfg(target_os = "linux")]
fn test_default_config_location_loaded() {
    let dir = TempDir::new().unwrap();
    env::set_var("XDG_CONFIG_HOME", dir.path());

    let expected = dir.path().join("cuedeck").join("config.toml");
    assert_eq!(default_config_path(), Some(expected.clone()));

    fs::create_dir_all(expected.parent().unwrap()).unwrap();
    fs::write(&expected, "port = 4300\n").unwrap();

    let toml = load_toml_config(None).unwrap();
    assert_eq!(toml.port, Some(4300));

    env::remove_var("XDG_CONFIG_HOME");
}

#[test]
fn test_credentials_enable_auth() {
    let overrides = Overrides {
        username: Some("stage".to_string()),
        password: Some("manager".to_string()),
        session_secret: Some("s3cret".to_string()),
        ..Default::default()
    };

    let config = ServerConfig::resolve(overrides, Default::default()).unwrap();
    assert!(config.auth_enabled());
    assert_eq!(config.session_secret.as_deref(), Some("s3cret"));
}

#[test]
fn test_empty_session_secret_treated_as_unset() {
    let overrides = Overrides {
        session_secret: Some(String::new()),
        ..Default::default()
    };

    let config = ServerConfig::resolve(overrides, Default::default()).unwrap();
    assert!(config.session_secret.is_none());
}
