//! Form runtime configuration.
//!
//! A small JSON file tunes navigation timing and the default field filter.
//! It lives in the standard configuration directory
//! (`~/.config/ichub/forms.json` on most platforms) unless
//! `ICHUB_FORMS_CONFIG` points elsewhere. A missing file yields defaults; a
//! malformed one is reported and also yields defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "ICHUB_FORMS_CONFIG";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "forms.json";

const DEFAULT_SETTLE_DELAY_MS: u64 = 300;
const DEFAULT_HIGHLIGHT_MS: u64 = 1500;

/// Error surfaced when reading or writing the configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Delay between expanding a section and revealing a field inside it.
    pub settle_delay_ms: u64,
    /// How long a navigated-to field stays highlighted.
    pub highlight_ms: u64,
    /// Start with only required fields visible.
    pub required_only: bool,
    /// Destination for tracing output while the terminal UI is active.
    pub log_file: Option<PathBuf>,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
            required_only: false,
            log_file: None,
        }
    }
}

impl FormsConfig {
    /// Loads the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Loads the configuration from `path`, falling back to defaults when the
    /// file is absent or unparsable.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => Ok(config),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse forms config; using defaults"
                    );
                    Ok(FormsConfig::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(FormsConfig::default()),
            Err(error) => Err(ConfigError::Io(error)),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    /// Log file path, defaulting to `forms.log` beside the config file.
    pub fn resolved_log_file(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => expand_tilde(&path.to_string_lossy()),
            None => default_config_path().with_file_name("forms.log"),
        }
    }
}

/// Resolves the configuration file path, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ichub")
        .join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = FormsConfig::load_from(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, FormsConfig::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("forms.json");
        fs::write(&path, "{ not json").expect("write");
        let config = FormsConfig::load_from(&path).expect("load");
        assert_eq!(config, FormsConfig::default());
    }

    #[test]
    fn partial_file_fills_remaining_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("forms.json");
        fs::write(&path, r#"{ "highlight_ms": 50, "required_only": true }"#).expect("write");
        let config = FormsConfig::load_from(&path).expect("load");
        assert_eq!(config.highlight_ms, 50);
        assert!(config.required_only);
        assert_eq!(config.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("forms.json");
        let config = FormsConfig {
            settle_delay_ms: 10,
            ..FormsConfig::default()
        };
        config.save_to(&path).expect("save");
        assert_eq!(FormsConfig::load_from(&path).expect("load"), config);
    }

    #[test]
    fn env_override_controls_default_path() {
        temp_env::with_var(CONFIG_PATH_ENV, Some("/tmp/ichub-test/forms.json"), || {
            assert_eq!(default_config_path(), PathBuf::from("/tmp/ichub-test/forms.json"));
        });
    }
}
