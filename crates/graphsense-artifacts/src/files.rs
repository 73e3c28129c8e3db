//! Temporary artifact files.

use std::io::Write;
use std::path::Path;

use graphsense_core::InstanceConfig;
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::env_file::EnvironmentFile;
use crate::error::{ArtifactError, ArtifactResult};
use crate::overlay::ComposeOverlay;

/// Write the env file for `config` into a fresh temporary file under `dir`.
pub fn render_environment(config: &InstanceConfig, dir: &Path) -> ArtifactResult<NamedTempFile> {
    let content = EnvironmentFile::from_config(config).to_string();
    write_temp(dir, "graphsense-env-", ".env", &content)
}

/// Write the compose overlay for `config` into a fresh temporary file under `dir`.
pub fn render_topology_overlay(
    config: &InstanceConfig,
    dir: &Path,
) -> ArtifactResult<NamedTempFile> {
    let content = ComposeOverlay::for_instance(config).to_yaml()?;
    write_temp(dir, "graphsense-compose-", ".yml", &content)
}

fn write_temp(dir: &Path, prefix: &str, suffix: &str, content: &str) -> ArtifactResult<NamedTempFile> {
    let mut file = Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|source| ArtifactError::Create {
            dir: dir.to_path_buf(),
            source,
        })?;

    // On error the half-written file is dropped here, which unlinks it.
    file.write_all(content.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| ArtifactError::Write {
            path: file.path().to_path_buf(),
            source,
        })?;

    debug!(path = ?file.path(), bytes = content.len(), "artifact written");
    Ok(file)
}

/// Both deploy artifacts. Dropping this deletes the files.
#[derive(Debug)]
pub struct RenderedArtifacts {
    env_file: NamedTempFile,
    overlay: NamedTempFile,
}

impl RenderedArtifacts {
    pub fn render_in(dir: &Path, config: &InstanceConfig) -> ArtifactResult<Self> {
        let env_file = render_environment(config, dir)?;
        let overlay = render_topology_overlay(config, dir)?;
        Ok(Self { env_file, overlay })
    }

    pub fn env_path(&self) -> &Path {
        self.env_file.path()
    }

    pub fn overlay_path(&self) -> &Path {
        self.overlay.path()
    }
}
