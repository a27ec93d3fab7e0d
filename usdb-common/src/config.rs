//! Configuration loading and path resolution
//!
//! Every path is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or broken config file never stops startup; it is logged and
//! the defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides the location of the TOML config file
pub const CONFIG_ENV_VAR: &str = "USDB_SYNCER_CONFIG";
/// Overrides the song directory
pub const SONG_DIR_ENV_VAR: &str = "USDB_SYNCER_SONG_DIR";
/// Overrides the song list cache file
pub const SONG_LIST_ENV_VAR: &str = "USDB_SYNCER_SONG_LIST";

const APP_DIR: &str = "usdb_syncer";

/// Contents of the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Directory downloaded songs are written to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_dir: Option<PathBuf>,
    /// Cache file of the available song list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_list: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging section of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file in addition to stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Fallback values for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub song_dir: PathBuf,
    pub song_list: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let cache_dir = dirs::cache_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR).join("cache"));
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR));
        let song_dir = dirs::home_dir()
            .map(|d| d.join("songs"))
            .unwrap_or_else(|| PathBuf::from("songs"));

        Self {
            song_dir,
            song_list: cache_dir.join("available_songs.json"),
            log_file: data_dir.join("usdb_syncer.log"),
            log_level: default_log_level(),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub song_dir: PathBuf,
    pub song_list: PathBuf,
    pub logging: LoggingConfig,
}

/// Resolves configuration from CLI arguments, environment, file and defaults
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    config_file: Option<PathBuf>,
    song_dir_arg: Option<PathBuf>,
    song_list_arg: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this config file instead of the environment/default location
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    pub fn with_song_dir_arg(mut self, path: Option<PathBuf>) -> Self {
        self.song_dir_arg = path;
        self
    }

    pub fn with_song_list_arg(mut self, path: Option<PathBuf>) -> Self {
        self.song_list_arg = path;
        self
    }

    /// Location of the TOML config file, whether or not it exists
    pub fn config_file_path(&self) -> PathBuf {
        if let Some(path) = &self.config_file {
            return path.clone();
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
            .join("config.toml")
    }

    fn load_file(&self) -> TomlConfig {
        let path = self.config_file_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return TomlConfig::default();
        }
        match load_toml_config(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                TomlConfig::default()
            }
        }
    }

    pub fn resolve(&self) -> ResolvedConfig {
        let file = self.load_file();
        let defaults = CompiledDefaults::for_current_platform();

        let song_dir = pick(&self.song_dir_arg, SONG_DIR_ENV_VAR, &file.song_dir, defaults.song_dir);
        let song_list = pick(&self.song_list_arg, SONG_LIST_ENV_VAR, &file.song_list, defaults.song_list);

        ResolvedConfig {
            song_dir,
            song_list,
            logging: file.logging,
        }
    }
}

fn pick(arg: &Option<PathBuf>, env_var: &str, file: &Option<PathBuf>, default: PathBuf) -> PathBuf {
    if let Some(path) = arg {
        return path.clone();
    }
    if let Ok(path) = std::env::var(env_var) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    file.clone().unwrap_or(default)
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    tracing::info!(path = %path.display(), "Wrote config file");
    Ok(())
}
