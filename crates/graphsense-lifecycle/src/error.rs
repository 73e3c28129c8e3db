//! Lifecycle errors and their classification.

use std::path::PathBuf;

use graphsense_artifacts::ArtifactError;
use graphsense_core::ConfigError;
use graphsense_executor::ExecError;
use graphsense_ports::PortError;
use graphsense_state::StateError;
use thiserror::Error;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Broad failure classes, for callers that react by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was rejected before any side effect.
    Precondition,
    /// No free port triple.
    ResourceExhaustion,
    /// The compose engine failed or could not be run.
    Executor,
    /// Deploy artifacts could not be written.
    Artifact,
    /// The deploy lock could not be taken.
    Lock,
    /// The registry could not be read.
    Bookkeeping,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("repository path does not exist: {0}")]
    RepositoryNotFound(PathBuf),

    #[error("cannot access repository path {path}: {source}")]
    RepositoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("docker-compose.yml not found at: {0}")]
    ComposeFileMissing(PathBuf),

    #[error("instance '{0}' already exists. Use 'remove' command first")]
    AlreadyExists(String),

    #[error("instance '{0}' does not exist")]
    NotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ports(#[from] PortError),

    #[error("failed to render deploy artifacts: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("failed to {action} instance {instance}: {source}")]
    Executor {
        action: &'static str,
        instance: String,
        #[source]
        source: ExecError,
    },

    #[error("failed to read the instance registry: {0}")]
    Registry(#[from] StateError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RepositoryNotFound(_)
            | Self::RepositoryAccess { .. }
            | Self::ComposeFileMissing(_)
            | Self::AlreadyExists(_)
            | Self::NotFound(_)
            | Self::Config(_) => ErrorKind::Precondition,
            Self::Ports(PortError::Exhausted { .. }) => ErrorKind::ResourceExhaustion,
            Self::Ports(PortError::Lock { .. }) => ErrorKind::Lock,
            Self::Artifact(_) => ErrorKind::Artifact,
            Self::Executor { .. } => ErrorKind::Executor,
            Self::Registry(_) => ErrorKind::Bookkeeping,
        }
    }

    pub(crate) fn executor(action: &'static str, instance: &str, source: ExecError) -> Self {
        Self::Executor {
            action,
            instance: instance.to_string(),
            source,
        }
    }
}
