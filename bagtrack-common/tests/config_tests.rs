//! Tests for configuration resolution and graceful degradation
//!
//! - Missing or broken TOML files fall back to defaults
//! - Root folder priority: CLI → ENV → TOML → default
//! - OCR key priority: ENV → TOML
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that manipulate BAGTRACK_* variables are marked with #[serial].

use bagtrack_common::config::{
    load_toml_config, load_toml_config_or_default, ConfigOrigin, prepare_root_folder, resolve_ocr_api_key,
    resolve_root_folder, RecognitionConfig, TomlConfig, DATABASE_FILE, ENV_OCR_KEY,
    ENV_ROOT_FOLDER,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_full_toml_parses() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bagtrack.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/bagtrack"
port = 6001

[logging]
level = "debug"

[import]
source_path = "/srv/bagtrack/today.csv"

[recognition]
endpoint = "https://example.cognitiveservices.azure.com/"
api_key = "toml-key"
max_attempts = 5
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    let (_, origin) = load_toml_config_or_default(Some(&path));
    assert_eq!(origin, ConfigOrigin::File(path.clone()));

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/bagtrack")));
    assert_eq!(config.port, Some(6001));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.import.source_path, PathBuf::from("/srv/bagtrack/today.csv"));
    // Unset fields keep their defaults
    assert_eq!(config.import.read_timeout_secs, 10);
    assert_eq!(config.recognition.max_attempts, 5);
    assert_eq!(config.recognition.poll_interval_ms, 1000);
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config: TomlConfig = toml::from_str("").unwrap();
    assert_eq!(config.logging.level, "info");
    assert!(config.recognition.endpoint.is_none());
}

#[test]
fn test_broken_toml_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    assert!(load_toml_config(&path).is_err());

    let (config, origin) = load_toml_config_or_default(Some(&path));
    assert!(config.port.is_none());
    assert!(matches!(origin, ConfigOrigin::Fallback { .. }));
}

#[test]
fn test_missing_explicit_toml_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.toml");

    let (config, origin) = load_toml_config_or_default(Some(&path));
    assert_eq!(config.logging.level, "info");
    assert!(matches!(origin, ConfigOrigin::Fallback { path: p, .. } if p == path));
}

#[test]
#[serial]
fn test_root_folder_env_beats_toml() {
    env::set_var(ENV_ROOT_FOLDER, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, &config);
    env::remove_var(ENV_ROOT_FOLDER);

    assert_eq!(resolved, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_root_folder_toml_beats_default() {
    env::remove_var(ENV_ROOT_FOLDER);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_root_folder_default_is_non_empty() {
    env::remove_var(ENV_ROOT_FOLDER);
    let resolved = resolve_root_folder(None, &TomlConfig::default());
    assert!(!resolved.as_os_str().is_empty());
}

#[test]
fn test_prepare_root_folder_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("data");

    let db_path = prepare_root_folder(&root).unwrap();

    assert!(root.is_dir());
    assert_eq!(db_path, root.join(DATABASE_FILE));
}

#[test]
#[serial]
fn test_ocr_key_env_beats_toml() {
    env::set_var(ENV_OCR_KEY, "env-key");
    let recognition = RecognitionConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    let key = resolve_ocr_api_key(&recognition);
    env::remove_var(ENV_OCR_KEY);

    assert_eq!(key.as_deref(), Some("env-key"));
}

#[test]
#[serial]
fn test_ocr_key_blank_values_ignored() {
    env::set_var(ENV_OCR_KEY, "   ");
    let recognition = RecognitionConfig {
        api_key: Some("".to_string()),
        ..Default::default()
    };

    let key = resolve_ocr_api_key(&recognition);
    env::remove_var(ENV_OCR_KEY);

    assert!(key.is_none());
}

#[test]
#[serial]
fn test_ocr_key_from_toml() {
    env::remove_var(ENV_OCR_KEY);
    let recognition = RecognitionConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_ocr_api_key(&recognition).as_deref(), Some("toml-key"));
}
