//! Host-facing settings.
//!
//! Defaults match what the web frontend has always used, so an empty config
//! is valid:
//!
//! ```yaml
//! storage_key: rss-reader-theme
//! dark_class: dark
//! media_query: "(prefers-color-scheme: dark)"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Key under which the selected mode is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "rss-reader-theme";

/// Class toggled on the document root when the dark theme is active.
pub const DEFAULT_DARK_CLASS: &str = "dark";

/// Media query whose match state is the environment signal.
pub const DARK_MEDIA_QUERY: &str = "(prefers-color-scheme: dark)";

/// Settings shared by the bootstrap path and [`ThemeSync`](crate::ThemeSync).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Persistence key for the selected mode.
    pub storage_key: String,
    /// Root class that marks dark rendering (web host).
    pub dark_class: String,
    /// Media query observed for the system preference (web host).
    pub media_query: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            dark_class: DEFAULT_DARK_CLASS.to_string(),
            media_query: DARK_MEDIA_QUERY.to_string(),
        }
    }
}

impl ThemeConfig {
    /// Parses a YAML document. Missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ThemeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Sets the persistence key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::invalid("storage_key", "must not be empty"));
        }
        if self.dark_class.trim().is_empty() || self.dark_class.contains(char::is_whitespace) {
            return Err(ConfigError::invalid(
                "dark_class",
                "must be a single non-empty class name",
            ));
        }
        if self.media_query.trim().is_empty() {
            return Err(ConfigError::invalid("media_query", "must not be empty"));
        }
        Ok(())
    }
}
