//! Error types for settings, naming, and secrets.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("cannot determine the home directory")]
    NoHomeDirectory,

    #[error("API keys file not found: {0}")]
    SecretsMissing(PathBuf),

    #[error("failed to parse API keys file {path}: {message}")]
    Secrets { path: PathBuf, message: String },

    #[error("invalid instance name {0:?}: nothing left after sanitizing")]
    InvalidInstanceName(String),
}
