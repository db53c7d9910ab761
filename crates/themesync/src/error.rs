//! Error types.
//!
//! None of these ever escape a theme operation: the bootstrap and
//! [`ThemeSync`](crate::ThemeSync) paths log collaborator failures and carry
//! on. They surface only from the collaborators themselves and from
//! configuration loading.

use std::io;
use std::path::PathBuf;

/// Failure reported by a host collaborator.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host lacks the capability (no window, no storage, ...).
    #[error("host capability unavailable: {0}")]
    Unavailable(&'static str),

    /// Reading or writing backing storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored data could not be decoded.
    #[error("corrupt preference data: {0}")]
    Corrupt(String),

    /// The host rejected the call (e.g. a quota or security error in a browser).
    #[error("host rejected the call: {0}")]
    Rejected(String),
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        HostError::Corrupt(err.to_string())
    }
}

/// Failure while loading a [`ThemeConfig`](crate::ThemeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The YAML was malformed or had unknown fields.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A field was present but unusable.
    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
