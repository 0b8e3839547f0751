//! Configuration loading and root folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`BAGTRACK_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or broken TOML file never prevents startup: the compiled
//! defaults are used and the caller reports the [`ConfigOrigin`].

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for the service
pub const DEFAULT_PORT: u16 = 5001;

/// Environment variable overriding the root folder
pub const ENV_ROOT_FOLDER: &str = "BAGTRACK_ROOT_FOLDER";

/// Environment variable carrying the OCR subscription key
pub const ENV_OCR_KEY: &str = "BAGTRACK_OCR_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "bagtrack.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the database (optional)
    pub root_folder: Option<PathBuf>,

    /// HTTP server port (optional, defaults to [`DEFAULT_PORT`])
    pub port: Option<u16>,

    pub logging: LoggingConfig,
    pub import: ImportConfig,
    pub recognition: RecognitionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Spreadsheet import settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// CSV file read by `POST /import-data` when no file is uploaded
    pub source_path: PathBuf,

    /// Upper bound on reading the source file
    pub read_timeout_secs: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("orders.csv"),
            read_timeout_secs: 10,
        }
    }
}

/// Cloud OCR (Azure Read) settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Service endpoint, e.g. `https://<resource>.cognitiveservices.azure.com/`
    pub endpoint: Option<String>,

    /// Subscription key; `BAGTRACK_OCR_KEY` takes priority
    pub api_key: Option<String>,

    /// Delay between polls of a submitted job
    pub poll_interval_ms: u64,

    /// Polls before giving up with a timeout
    pub max_attempts: u32,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            poll_interval_ms: 1000,
            max_attempts: 15,
            request_timeout_secs: 30,
        }
    }
}

/// Platform config file location (`~/.config/bagtrack/bagtrack.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bagtrack").join("bagtrack.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// No file present; compiled defaults
    Defaults,
    /// A file was expected but could not be used; compiled defaults
    Fallback { path: PathBuf, reason: String },
}

/// Load the TOML config, falling back to defaults on any problem
///
/// An explicit path that cannot be loaded yields [`ConfigOrigin::Fallback`];
/// a missing file at the implicit default location is expected and yields
/// [`ConfigOrigin::Defaults`]. Nothing is logged here because this runs
/// before the tracing subscriber is installed.
pub fn load_toml_config_or_default(explicit: Option<&Path>) -> (TomlConfig, ConfigOrigin) {
    let (path, is_explicit) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return (TomlConfig::default(), ConfigOrigin::Defaults),
        },
    };

    if !is_explicit && !path.exists() {
        return (TomlConfig::default(), ConfigOrigin::Defaults);
    }

    match load_toml_config(&path) {
        Ok(config) => (config, ConfigOrigin::File(path)),
        Err(e) => (
            TomlConfig::default(),
            ConfigOrigin::Fallback {
                path,
                reason: e.to_string(),
            },
        ),
    }
}

/// Resolve the root folder: CLI → ENV → TOML → compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ENV_ROOT_FOLDER) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bagtrack"))
        .unwrap_or_else(|| PathBuf::from("./bagtrack_data"))
}

/// Create the root folder if missing and return the database path inside it
pub fn prepare_root_folder(root_folder: &Path) -> Result<PathBuf> {
    if !root_folder.exists() {
        std::fs::create_dir_all(root_folder)?;
        info!("Created root folder: {}", root_folder.display());
    }
    Ok(root_folder.join(DATABASE_FILE))
}

/// Resolve the OCR subscription key: ENV → TOML
///
/// Returns `None` when neither source has a usable key; OCR requests are
/// then rejected at request time instead of failing startup.
pub fn resolve_ocr_api_key(recognition: &RecognitionConfig) -> Option<String> {
    let env_key = std::env::var(ENV_OCR_KEY).ok().filter(|k| is_valid_key(k));
    let toml_key = recognition.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("OCR key found in both environment and TOML. Using environment (highest priority).");
    }

    if let Some(key) = env_key {
        info!("OCR key loaded from environment variable");
        return Some(key);
    }

    if let Some(key) = toml_key {
        info!("OCR key loaded from TOML config");
        return Some(key);
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
