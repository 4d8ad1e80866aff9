//! Client settings persisted as TOML.
//!
//! Settings live in the platform-specific configuration folder:
//! - macOS: ~/Library/Application Support/com.ordercheck.ordercheck/
//! - Windows: %APPDATA%/ordercheck/ordercheck/config/
//! - Linux: ~/.config/ordercheck/
//!
//! Command-line flags and `ORDERCHECK_BASE_URL` take precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use ordercheck_client::{ClientConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "ordercheck";
const APP_NAME: &str = "ordercheck";
const CONFIG_FILENAME: &str = "settings.toml";

/// Environment variable overriding the server address.
pub const BASE_URL_ENV: &str = "ORDERCHECK_BASE_URL";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine the settings directory")]
    NoConfigDir,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Address of the spec server.
    pub base_url: String,
    /// Request timeout in seconds; requests never time out when unset.
    pub request_timeout_secs: Option<u64>,
    /// Sample rows in a downloaded template.
    pub template_rows: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            template_rows: 5,
        }
    }
}

/// Values that override the settings file for one run.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Value of [`BASE_URL_ENV`].
    pub env_base_url: Option<String>,
}

impl ClientSettings {
    /// Apply overrides: flags first, then the environment, then the file.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        let env = overrides.env_base_url.filter(|url| !url.trim().is_empty());
        if let Some(url) = overrides.base_url.or(env) {
            self.base_url = url;
        }
        if overrides.timeout_secs.is_some() {
            self.request_timeout_secs = overrides.timeout_secs;
        }
        self
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Path of the settings file, if the platform directory is known.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings, falling back to defaults when the file is missing,
/// unreadable or invalid.
pub fn load_settings() -> ClientSettings {
    let Some(path) = settings_path() else {
        tracing::warn!("Could not determine settings path, using defaults");
        return ClientSettings::default();
    };
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> ClientSettings {
    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings file: {e}, using defaults");
                ClientSettings::default()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            ClientSettings::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read settings file: {e}, using defaults");
            ClientSettings::default()
        }
    }
}

/// Save settings to the platform settings file.
pub fn save_settings(settings: &ClientSettings) -> Result<PathBuf, SettingsError> {
    let path = settings_path().ok_or(SettingsError::NoConfigDir)?;
    save_settings_to(settings, &path)?;
    Ok(path)
}

/// Write settings to `path`, creating the parent directory if needed.
pub fn save_settings_to(settings: &ClientSettings, path: &Path) -> Result<(), SettingsError> {
    let io_error = |source: std::io::Error| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let content = toml::to_string_pretty(settings)?;
    fs::write(path, content).map_err(io_error)?;
    tracing::info!(path = %path.display(), "Saved settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: ClientSettings = toml::from_str("request_timeout_secs = 30").unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.template_rows, 5);
        assert_eq!(
            settings.client_config().timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn flags_win_over_environment() {
        let settings = ClientSettings::default().with_overrides(Overrides {
            base_url: Some("http://flag:1".to_string()),
            timeout_secs: None,
            env_base_url: Some("http://env:2".to_string()),
        });
        assert_eq!(settings.base_url, "http://flag:1");

        let settings = ClientSettings::default().with_overrides(Overrides {
            env_base_url: Some("http://env:2".to_string()),
            ..Overrides::default()
        });
        assert_eq!(settings.base_url, "http://env:2");
    }

    #[test]
    fn zero_timeout_disables_timeout() {
        let settings = ClientSettings::default().with_overrides(Overrides {
            timeout_secs: Some(0),
            ..Overrides::default()
        });
        assert!(settings.client_config().timeout.is_none());
    }
}
