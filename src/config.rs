// ⚙️ Configuration - optional TOML file, every key has a default
//
// output_dir = "./exports"
// first_time = true
// log_file   = "fiae.log"

use crate::error::{PrestationError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "fiae.toml";
pub const DEFAULT_LOG_FILE: &str = "fiae.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where CSV/JSON exports are written
    pub output_dir: PathBuf,

    /// Start sessions in "first mapping" mode (light recommendation)
    pub first_time: bool,

    /// Log file used while the terminal UI owns the screen
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            output_dir: PathBuf::from("."),
            first_time: true,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PrestationError::Config {
            message: e.to_string(),
        })
    }

    /// Read `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| PrestationError::Config {
            message: format!("{}: {}", path.display(), e),
        })?;

        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.first_time);
        assert_eq!(config.log_file, PathBuf::from("fiae.log"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml_str("output_dir = \"exports\"\nfirst_time = false\n").unwrap();

        assert_eq!(config.output_dir, PathBuf::from("exports"));
        assert!(!config.first_time);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("first_time = \"maybe\"").unwrap_err();
        assert!(matches!(err, PrestationError::Config { .. }));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_error_names_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fiae.toml");
        fs::write(&path, "first_time = \"maybe\"\n").unwrap();

        let message = AppConfig::load(&path).unwrap_err().to_string();

        assert!(message.starts_with("Configuration error: "));
        assert_eq!(message.matches("Configuration error").count(), 1);
        assert!(message.contains("fiae.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fiae.toml");
        fs::write(&path, "log_file = \"/tmp/fiae-test.log\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.log_file, PathBuf::from("/tmp/fiae-test.log"));
        assert!(config.first_time);
    }
}
