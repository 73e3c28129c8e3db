//! Cross-process deploy lock.
//!
//! An exclusive `flock` on a file in the GraphSense home directory. Held from
//! port allocation until the compose engine has bound the ports, so two
//! deploys on one host cannot pick the same triple.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info};

use crate::error::{PortError, PortResult};

/// Guard for the deploy lock. Released on drop.
#[derive(Debug)]
pub struct DeployLock {
    file: File,
    path: PathBuf,
}

impl DeployLock {
    /// Acquire the lock at `path`, blocking while another process holds it.
    pub fn acquire(path: &Path) -> PortResult<Self> {
        let lock_err = |source| PortError::Lock {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(lock_err)?;

        if file.try_lock_exclusive().is_err() {
            info!(?path, "another deploy is in progress, waiting for it to finish");
            file.lock_exclusive().map_err(lock_err)?;
        }

        debug!(?path, "deploy lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DeployLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(path = ?self.path, "deploy lock released");
    }
}
