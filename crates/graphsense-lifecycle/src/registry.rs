//! Instance registry: live state from the engine, durable state from redb.
//!
//! The two sides are deliberately separate. `exists` and `live_containers`
//! ask the compose engine what is actually there; `store`, `list_containers`,
//! `remove_all`, and `list_all` only touch the durable record of past
//! deploys. Nothing here reconciles one with the other.

use std::path::{Path, PathBuf};

use chrono::Utc;
use graphsense_core::InstanceConfig;
use graphsense_executor::{ContainerSummary, DockerCompose, ExecResult};
use graphsense_state::{InstanceRecord, StateResult, StateStore};
use tracing::debug;

enum Backing {
    /// Opened per operation so no process holds the file longer than needed.
    File(PathBuf),
    Shared(StateStore),
}

pub struct InstanceRegistry {
    compose: DockerCompose,
    backing: Backing,
}

impl InstanceRegistry {
    /// Registry persisted at `path`.
    pub fn at_path(compose: DockerCompose, path: &Path) -> Self {
        Self {
            compose,
            backing: Backing::File(path.to_path_buf()),
        }
    }

    /// Registry over an already-open store (e.g. in-memory for tests).
    pub fn with_store(compose: DockerCompose, store: StateStore) -> Self {
        Self {
            compose,
            backing: Backing::Shared(store),
        }
    }

    fn with_store_handle<T>(&self, f: impl FnOnce(&StateStore) -> StateResult<T>) -> StateResult<T> {
        match &self.backing {
            Backing::File(path) => f(&StateStore::open(path)?),
            Backing::Shared(store) => f(store),
        }
    }

    // ── Live ────────────────────────────────────────────────────────

    /// Whether the engine knows any container of the project, stopped included.
    ///
    /// An engine query that fails counts as "does not exist".
    pub fn exists(&self, name: &str) -> bool {
        match self.compose.project_containers(name) {
            Ok(containers) => !containers.is_empty(),
            Err(e) => {
                debug!(instance = name, error = %e, "existence query failed");
                false
            }
        }
    }

    pub fn live_containers(&self, name: &str) -> ExecResult<Vec<ContainerSummary>> {
        self.compose.project_containers(name)
    }

    // ── Durable ─────────────────────────────────────────────────────

    /// Record one row per service container, replacing any previous deploy.
    pub fn store(&self, config: &InstanceConfig) -> StateResult<()> {
        let records = InstanceRecord::for_config(config, Utc::now());
        self.with_store_handle(|store| store.put_records(&records))
    }

    pub fn list_containers(&self, name: &str) -> StateResult<Vec<InstanceRecord>> {
        self.with_store_handle(|store| store.list_for_instance(name))
    }

    /// Forget every record of `name`. Zero means nothing was recorded.
    pub fn remove_all(&self, name: &str) -> StateResult<u32> {
        self.with_store_handle(|store| store.delete_instance(name))
    }

    pub fn list_all(&self) -> StateResult<Vec<InstanceRecord>> {
        self.with_store_handle(StateStore::list_all)
    }
}

