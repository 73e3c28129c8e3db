//! graphsense-artifacts: the two files handed to compose on deploy.
//!
//! - An env file ([`EnvironmentFile`]) with the repository path, the three
//!   host ports, fixed service credentials, and optional API keys.
//! - A compose overlay ([`ComposeOverlay`]) that renames every container,
//!   volume, and network after the instance and publishes the app port.
//!
//! Both are rendered from a typed [`InstanceConfig`](graphsense_core::InstanceConfig)
//! into temporary files owned by [`RenderedArtifacts`]; dropping the guard
//! deletes them, whichever way the deploy ends.

pub mod env_file;
pub mod error;
pub mod files;
pub mod overlay;

pub use env_file::EnvironmentFile;
pub use error::{ArtifactError, ArtifactResult};
pub use files::{RenderedArtifacts, render_environment, render_topology_overlay};
pub use overlay::ComposeOverlay;
