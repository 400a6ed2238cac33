#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for distro
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/distro/config.toml)
//! - Environment variables
//! - CLI flags (applied by the front-end)

pub mod constants;

use distro_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub transfer: TransferConfig,

    #[serde(default)]
    pub cleanup: CleanupConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub connect_timeout: u64, // seconds
    /// Longest wait for the next body chunk before the transfer fails
    #[serde(default = "default_timeout")]
    pub read_timeout: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Bulk transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Concurrency cap for version batches
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Concurrency cap for quick-link batches
    #[serde(default = "default_quick_link_max_concurrent")]
    pub quick_link_max_concurrent: usize,
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    /// Fraction of the total that forces a progress update regardless of time
    #[serde(default = "default_progress_min_delta")]
    pub progress_min_delta: f32,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

/// Temporary artifact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Defaults to `<cache_dir>/distro`
    pub temp_dir: Option<PathBuf>,
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default = "default_deferred_delete_secs")]
    pub deferred_delete_secs: u64,
}

/// Platform install/uninstall commands
///
/// Each entry is an argv template; `{file}` and `{package}` are substituted
/// per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,
    #[serde(default = "default_uninstall_command")]
    pub uninstall_command: Vec<String>,
    /// Optional metadata probe (e.g. `aapt dump badging {file}`); downloads
    /// carry no metadata when unset
    #[serde(default)]
    pub inspect_command: Option<Vec<String>>,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub catalog_path: Option<PathBuf>,
}

// Default implementations

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_timeout(),
            read_timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            quick_link_max_concurrent: default_quick_link_max_concurrent(),
            progress_interval_ms: default_progress_interval_ms(),
            progress_min_delta: default_progress_min_delta(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            artifact_prefix: default_artifact_prefix(),
            artifact_extension: default_artifact_extension(),
            stale_after_secs: default_stale_after_secs(),
            deferred_delete_secs: default_deferred_delete_secs(),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            install_command: default_install_command(),
            uninstall_command: default_uninstall_command(),
            inspect_command: None,
        }
    }
}

// Default value functions for serde
fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("distro/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_concurrent() -> usize {
    10
}

fn default_quick_link_max_concurrent() -> usize {
    5
}

fn default_progress_interval_ms() -> u64 {
    100
}

fn default_progress_min_delta() -> f32 {
    0.01
}

fn default_buffer_size() -> usize {
    8192
}

fn default_artifact_prefix() -> String {
    "temp_".to_string()
}

fn default_artifact_extension() -> String {
    "apk".to_string()
}

fn default_stale_after_secs() -> u64 {
    10
}

fn default_deferred_delete_secs() -> u64 {
    2
}

fn default_install_command() -> Vec<String> {
    ["adb", "install", "-r", constants::FILE_PLACEHOLDER]
        .map(String::from)
        .to_vec()
}

fn default_uninstall_command() -> Vec<String> {
    ["adb", "uninstall", constants::PACKAGE_PLACEHOLDER]
        .map(String::from)
        .to_vec()
}

impl NetworkConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }
}

impl TransferConfig {
    #[must_use]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

impl CleanupConfig {
    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    #[must_use]
    pub fn deferred_delete(&self) -> Duration {
        Duration::from_secs(self.deferred_delete_secs)
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Write the configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub async fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            error: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError {
                    path: parent.display().to_string(),
                    error: e.to_string(),
                })?;
        }

        fs::write(path, contents)
            .await
            .map_err(|e| ConfigError::WriteError {
                path: path.display().to_string(),
                error: e.to_string(),
            })?;
        Ok(())
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // DISTRO_MAX_CONCURRENT
        if let Ok(value) = std::env::var("DISTRO_MAX_CONCURRENT") {
            self.transfer.max_concurrent = value.parse().map_err(|_| ConfigError::InvalidValue {
                field: "DISTRO_MAX_CONCURRENT".to_string(),
                value,
            })?;
        }

        // DISTRO_TEMP_DIR
        if let Ok(value) = std::env::var("DISTRO_TEMP_DIR") {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "DISTRO_TEMP_DIR".to_string(),
                    value,
                }
                .into());
            }
            self.cleanup.temp_dir = Some(PathBuf::from(value));
        }

        // DISTRO_CONNECT_TIMEOUT
        if let Ok(value) = std::env::var("DISTRO_CONNECT_TIMEOUT") {
            self.network.connect_timeout =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "DISTRO_CONNECT_TIMEOUT".to_string(),
                    value,
                })?;
        }

        Ok(())
    }

    /// Reject values the orchestrator cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |field: &str, value: String| -> Error {
            ConfigError::InvalidValue {
                field: field.to_string(),
                value,
            }
            .into()
        };

        if self.transfer.max_concurrent == 0 {
            return Err(invalid("transfer.max_concurrent", "0".into()));
        }
        if self.transfer.quick_link_max_concurrent == 0 {
            return Err(invalid("transfer.quick_link_max_concurrent", "0".into()));
        }
        if self.transfer.buffer_size == 0 {
            return Err(invalid("transfer.buffer_size", "0".into()));
        }
        if !(0.0..=1.0).contains(&self.transfer.progress_min_delta) {
            return Err(invalid(
                "transfer.progress_min_delta",
                self.transfer.progress_min_delta.to_string(),
            ));
        }
        if self.cleanup.artifact_prefix.is_empty() {
            return Err(invalid("cleanup.artifact_prefix", String::new()));
        }
        if self.install.install_command.is_empty() {
            return Err(invalid("install.install_command", "[]".into()));
        }
        if self.install.uninstall_command.is_empty() {
            return Err(invalid("install.uninstall_command", "[]".into()));
        }
        if self
            .install
            .inspect_command
            .as_ref()
            .is_some_and(Vec::is_empty)
        {
            return Err(invalid("install.inspect_command", "[]".into()));
        }
        Ok(())
    }

    /// Get the temporary artifact directory (with default)
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.cleanup.temp_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(constants::APP_DIR_NAME)
        })
    }

    /// Get the catalog file path (with default)
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.paths.catalog_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(constants::APP_DIR_NAME)
                .join(constants::CATALOG_FILE_NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.transfer.max_concurrent, 10);
        assert_eq!(config.transfer.quick_link_max_concurrent, 5);
        assert_eq!(config.transfer.progress_interval(), Duration::from_millis(100));
        assert_eq!(config.transfer.buffer_size, 8192);
        assert_eq!(config.network.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.cleanup.stale_after(), Duration::from_secs(10));
        assert_eq!(config.cleanup.deferred_delete(), Duration::from_secs(2));
        assert_eq!(config.install.install_command[3], "{file}");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let mut config = Config::default();
        config.transfer.quick_link_max_concurrent = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quick_link_max_concurrent"));
    }

    #[test]
    fn explicit_temp_dir_wins() {
        let mut config = Config::default();
        config.cleanup.temp_dir = Some(PathBuf::from("/tmp/somewhere"));
        assert_eq!(config.temp_dir(), PathBuf::from("/tmp/somewhere"));
    }
}
