//! Registry store errors.
//!
//! None of these abort a lifecycle operation on their own: once containers
//! exist, the orchestrator downgrades registry failures to warnings.

use std::path::PathBuf;

use thiserror::Error;

pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open registry {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("registry {0} is in use by another graphsense process")]
    Busy(PathBuf),

    #[error("registry transaction failed: {0}")]
    Transaction(String),

    #[error("registry storage error: {0}")]
    Storage(String),

    #[error("corrupt registry record {key}: {message}")]
    Corrupt { key: String, message: String },

    #[error("failed to encode registry record: {0}")]
    Encode(String),
}
