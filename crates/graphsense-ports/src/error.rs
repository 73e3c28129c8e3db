//! Port allocation errors.

use std::path::PathBuf;

use thiserror::Error;

pub type PortResult<T> = Result<T, PortError>;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("unable to find available port set starting from {start}")]
    Exhausted { start: u16 },

    #[error("failed to acquire deploy lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
