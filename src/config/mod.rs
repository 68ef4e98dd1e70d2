// SPDX-License-Identifier: MPL-2.0
//! This module handles the crate's configuration, including loading and saving
//! codec settings to a `settings.toml` file.
//!
//! # Examples
//!
//! ```no_run
//! use codec_adapter::config::{self, Config};
//! use std::path::PathBuf;
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.backend = Some("process".to_string());
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//!
//! // To load/save from a specific path (e.g., for testing)
//! let temp_dir = PathBuf::from("./temp_config_dir");
//! std::fs::create_dir_all(&temp_dir).unwrap();
//! let temp_file = temp_dir.join("test_settings.toml");
//! config::save_to_path(&config, &temp_file).expect("Failed to save to path");
//! let loaded_config = config::load_from_path(&temp_file).expect("Failed to load from path");
//! assert_eq!(loaded_config.backend, Some("process".to_string()));
//! std::fs::remove_dir_all(&temp_dir).unwrap();
//! ```

pub mod defaults;

use crate::domain::codec::Backend;
use crate::domain::diagnostics::BufferCapacity;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "codec_adapter";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `ffmpeg` executable name or path.
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
    /// Directory searched for codec tools before `PATH`.
    #[serde(default)]
    pub tool_dir: Option<PathBuf>,
    /// `"library"` or `"process"`; unset picks the first backend present.
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub pixel_format: Option<String>,
    #[serde(default)]
    pub history_capacity: Option<usize>,
}

impl Config {
    /// Parsed backend preference.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for an unknown backend name.
    pub fn backend_preference(&self) -> Result<Option<Backend>> {
        self.backend
            .as_deref()
            .map(str::parse::<Backend>)
            .transpose()
            .map_err(Into::into)
    }

    /// History capacity, clamped to the valid range.
    #[must_use]
    pub fn history_capacity(&self) -> BufferCapacity {
        self.history_capacity
            .map(BufferCapacity::new)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn ffmpeg_path(&self) -> PathBuf {
        self.ffmpeg_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::DEFAULT_FFMPEG))
    }

    #[must_use]
    pub fn pixel_format(&self) -> &str {
        self.pixel_format
            .as_deref()
            .unwrap_or(defaults::DEFAULT_PIXEL_FORMAT)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            log::warn!("ignoring invalid config {}: {err}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_settings() {
        let config = Config {
            ffmpeg_path: Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg")),
            tool_dir: Some(PathBuf::from("/opt/codecs")),
            backend: Some("library".to_string()),
            pixel_format: Some("yuv420p".to_string()),
            history_capacity: Some(25),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert!(loaded.backend.is_none());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let result = load_from_path(&temp_dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn default_config_resolves_to_defaults() {
        let config = Config::default();
        assert_eq!(config.ffmpeg_path(), PathBuf::from("ffmpeg"));
        assert_eq!(config.pixel_format(), "yuv444p");
        assert_eq!(config.history_capacity().value(), defaults::DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.backend_preference().unwrap(), None);
    }

    #[test]
    fn backend_preference_parses_or_fails() {
        let mut config = Config {
            backend: Some("process".to_string()),
            ..Config::default()
        };
        assert_eq!(config.backend_preference().unwrap(), Some(Backend::Process));

        config.backend = Some("gpu".to_string());
        assert!(matches!(config.backend_preference(), Err(Error::Config(_))));
    }

    #[test]
    fn history_capacity_is_clamped() {
        let config = Config {
            history_capacity: Some(0),
            ..Config::default()
        };
        assert_eq!(config.history_capacity().value(), 1);
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "pixel_format = \"yuv420p\"\n").unwrap();

        let loaded = load_from_path(&config_path).unwrap();
        assert_eq!(loaded.pixel_format(), "yuv420p");
        assert!(loaded.tool_dir.is_none());
    }
}
