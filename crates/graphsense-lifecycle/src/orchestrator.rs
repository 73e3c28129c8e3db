//! Lifecycle orchestrator.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use graphsense_artifacts::RenderedArtifacts;
use graphsense_core::{
    InstanceConfig, InstanceName, PortSet, Reporter, Secrets, ServiceKind, Settings,
};
use graphsense_executor::{ContainerSummary, DockerCompose};
use graphsense_health::{ReadinessOutcome, ReadinessPolicy, wait_until_up};
use graphsense_ports::{DeployLock, PortAllocator, PortAvailability};
use graphsense_state::InstanceRecord;
use tracing::{debug, info};

use crate::confirm::Confirm;
use crate::error::{LifecycleError, LifecycleResult};
use crate::registry::InstanceRegistry;

/// Input of [`Orchestrator::deploy`].
#[derive(Debug, Clone, Default)]
pub struct DeployRequest {
    pub repository: PathBuf,
    /// Raw name; derived from the repository directory when absent.
    pub name: Option<String>,
    /// Base port to start searching from; the configured default when absent.
    pub base_port: Option<u16>,
}

impl DeployRequest {
    pub fn new(repository: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn base_port(mut self, port: u16) -> Self {
        self.base_port = Some(port);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    pub name: InstanceName,
    pub repository: PathBuf,
    pub ports: PortSet,
    pub readiness: ReadinessOutcome,
    /// Whether the registry accepted the new records.
    pub recorded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The operator declined; nothing was touched.
    Cancelled,
    Removed {
        /// `down` failed and containers were force-removed by label instead.
        swept: bool,
        volumes_removed: usize,
        /// `None` when the registry could not be updated.
        records_removed: Option<u32>,
    },
}

/// Live containers and last-known records of one instance.
#[derive(Debug, Clone)]
pub struct InstanceStatus {
    pub name: InstanceName,
    pub containers: Vec<ContainerSummary>,
    pub records: Vec<InstanceRecord>,
}

/// One row of [`Orchestrator::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSummary {
    pub name: String,
    pub repository_path: Option<PathBuf>,
    pub ports: Option<PortSet>,
    pub containers: Vec<ContainerSummary>,
    /// Present in the registry.
    pub recorded: bool,
}

impl InstanceSummary {
    /// Recorded, but the engine has no containers for it.
    pub fn is_drifted(&self) -> bool {
        self.recorded && self.containers.is_empty()
    }

    pub fn running(&self) -> usize {
        self.containers.iter().filter(|c| c.is_up()).count()
    }
}

/// Output of [`Orchestrator::port_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortReport {
    pub candidates: Vec<PortAvailability>,
    pub next_available: PortSet,
}

/// Runs lifecycle transitions for instances on this host.
pub struct Orchestrator {
    settings: Settings,
    compose: DockerCompose,
    registry: InstanceRegistry,
    allocator: PortAllocator,
    reporter: Arc<dyn Reporter>,
    artifact_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(
        settings: Settings,
        compose: DockerCompose,
        registry: InstanceRegistry,
        allocator: PortAllocator,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            settings,
            compose,
            registry,
            allocator,
            reporter,
            artifact_dir: std::env::temp_dir(),
        }
    }

    /// Real engine, real sockets, file-backed registry.
    pub fn from_settings(settings: Settings, reporter: Arc<dyn Reporter>) -> Self {
        let compose = DockerCompose::system(&settings);
        let registry = InstanceRegistry::at_path(compose.clone(), &settings.registry_path());
        let allocator = PortAllocator::default().with_default_base(settings.default_base_port);
        Self::new(settings, compose, registry, allocator, reporter)
    }

    /// Directory for the ephemeral env file and overlay.
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Port triples recorded for instances other than `except`, running or not.
    /// An unreadable registry reserves nothing.
    fn reserved_ports(&self, except: Option<&InstanceName>) -> Vec<PortSet> {
        let records = match self.registry.list_all() {
            Ok(records) => records,
            Err(e) => {
                self.reporter
                    .warning(&format!("Failed to read the instance registry: {e}"));
                return Vec::new();
            }
        };
        let mut reserved: Vec<PortSet> = Vec::new();
        for record in records {
            if except.is_some_and(|name| name.as_str() == record.instance_name) {
                continue;
            }
            if !reserved.contains(&record.ports) {
                reserved.push(record.ports);
            }
        }
        reserved
    }

    fn ensure_exists(&self, name: &InstanceName) -> LifecycleResult<()> {
        if self.registry.exists(name.as_str()) {
            Ok(())
        } else {
            Err(LifecycleError::NotFound(name.to_string()))
        }
    }

    // ── deploy ──────────────────────────────────────────────────────

    /// Deploy a new instance for a repository.
    ///
    /// Every precondition is checked before ports are allocated or the
    /// engine runs. The deploy lock covers allocation through `up`.
    pub fn deploy(&self, request: &DeployRequest) -> LifecycleResult<DeployOutcome> {
        let repository = resolve_repository(&request.repository)?;

        let name = match request.name.as_deref() {
            Some(raw) => InstanceName::parse(raw)?,
            None => InstanceName::from_repository(&repository),
        };

        self.reporter.info(&format!(
            "Deploying instance: {name} for repository: {}",
            repository.display()
        ));

        let compose_file = self.settings.compose_file_path()?;
        if !compose_file.is_file() {
            return Err(LifecycleError::ComposeFileMissing(compose_file));
        }
        let secrets = Secrets::load(&self.settings.secrets_path())?;

        if self.registry.exists(name.as_str()) {
            return Err(LifecycleError::AlreadyExists(name.to_string()));
        }

        self.settings.ensure_home()?;
        let config = {
            let _lock = DeployLock::acquire(&self.settings.lock_path())?;
            let reserved = self.reserved_ports(Some(&name));
            let ports = self
                .allocator
                .allocate_avoiding(request.base_port, &reserved)?;
            debug!(instance = %name, %ports, "ports allocated");

            let config = InstanceConfig {
                repository_path: repository,
                name,
                ports,
                secrets,
            };
            self.launch(&config, &compose_file)?;
            config
        };

        let policy = ReadinessPolicy::from_settings(&self.settings.health);
        let readiness = wait_until_up(
            &self.compose,
            config.name.as_str(),
            &policy,
            self.reporter.as_ref(),
        );
        if !readiness.is_ready() {
            self.reporter
                .warning("Health check failed, but continuing...");
        }

        let recorded = match self.registry.store(&config) {
            Ok(()) => true,
            Err(e) => {
                self.reporter
                    .warning(&format!("Failed to store container information: {e}"));
                false
            }
        };

        let ports = config.ports;
        self.reporter
            .success(&format!("Instance '{}' deployed successfully!", config.name));
        self.reporter.info("Access URLs:");
        self.reporter
            .info(&format!("  MCP Server: http://localhost:{}", ports.app));
        self.reporter
            .info(&format!("  PostgreSQL: localhost:{}", ports.data));
        self.reporter
            .info(&format!("  Neo4j Bolt: bolt://localhost:{}", ports.graph));

        Ok(DeployOutcome {
            name: config.name,
            repository: config.repository_path,
            ports,
            readiness,
            recorded,
        })
    }

    /// Render artifacts and bring the stack up. The artifacts are deleted
    /// when this returns, whatever the outcome.
    fn launch(&self, config: &InstanceConfig, compose_file: &Path) -> LifecycleResult<()> {
        let artifacts = RenderedArtifacts::render_in(&self.artifact_dir, config)?;
        self.reporter
            .info(&format!("Starting services for instance: {}", config.name));
        self.compose
            .up(
                config.name.as_str(),
                compose_file,
                artifacts.overlay_path(),
                artifacts.env_path(),
            )
            .map_err(|e| LifecycleError::executor("deploy", config.name.as_str(), e))?;
        info!(instance = %config.name, ports = %config.ports, "instance started");
        Ok(())
    }

    // ── stop / start ────────────────────────────────────────────────

    pub fn stop(&self, name: &InstanceName) -> LifecycleResult<()> {
        self.ensure_exists(name)?;
        self.reporter.info(&format!("Stopping instance: {name}"));
        self.compose
            .stop(name.as_str())
            .map_err(|e| LifecycleError::executor("stop", name.as_str(), e))?;
        self.reporter.success(&format!("Instance '{name}' stopped."));
        Ok(())
    }

    pub fn start(&self, name: &InstanceName) -> LifecycleResult<()> {
        self.ensure_exists(name)?;
        self.reporter.info(&format!("Starting instance: {name}"));
        self.compose
            .start(name.as_str())
            .map_err(|e| LifecycleError::executor("start", name.as_str(), e))?;
        self.reporter.success(&format!("Instance '{name}' started."));
        Ok(())
    }

    // ── remove ──────────────────────────────────────────────────────

    /// Permanently remove an instance, its volumes, and its records.
    ///
    /// A failing `down` falls back to force-removing containers by project
    /// label. Volume sweep and registry cleanup are best-effort.
    pub fn remove(
        &self,
        name: &InstanceName,
        confirm: &dyn Confirm,
    ) -> LifecycleResult<RemoveOutcome> {
        self.ensure_exists(name)?;

        self.reporter.warning(&format!(
            "This will permanently remove instance '{name}' and all its data."
        ));
        if !confirm.confirm("Are you sure?") {
            self.reporter.info("Cancelled.");
            return Ok(RemoveOutcome::Cancelled);
        }

        self.reporter.info(&format!("Removing instance: {name}"));
        let project = name.as_str();

        let swept = match self.compose.down(project) {
            Ok(()) => false,
            Err(e) => {
                debug!(instance = project, error = %e, "compose down failed");
                self.reporter.warning(
                    "Failed to cleanly remove instance with docker-compose, trying manual cleanup...",
                );
                self.sweep_containers(project);
                true
            }
        };

        self.reporter.info("Removing associated volumes...");
        let volumes_removed = self.sweep_volumes(name);

        let records_removed = match self.registry.remove_all(project) {
            Ok(count) => {
                debug!(instance = project, count, "registry records removed");
                Some(count)
            }
            Err(e) => {
                self.reporter
                    .warning(&format!("Failed to remove container records: {e}"));
                None
            }
        };

        self.reporter.success(&format!("Instance '{name}' removed."));
        Ok(RemoveOutcome::Removed {
            swept,
            volumes_removed,
            records_removed,
        })
    }

    fn sweep_containers(&self, project: &str) {
        let result = self
            .compose
            .container_ids(project)
            .and_then(|ids| self.compose.force_remove(&ids).map(|()| ids.len()));
        match result {
            Ok(count) => debug!(instance = project, count, "containers force-removed"),
            Err(e) => self
                .reporter
                .warning(&format!("Manual container cleanup failed: {e}")),
        }
    }

    fn sweep_volumes(&self, name: &InstanceName) -> usize {
        let result = self
            .compose
            .volumes_with_prefix(&name.volume_prefix())
            .and_then(|volumes| self.compose.remove_volumes(&volumes).map(|()| volumes.len()));
        match result {
            Ok(count) => count,
            Err(e) => {
                self.reporter
                    .warning(&format!("Failed to remove volumes: {e}"));
                0
            }
        }
    }

    // ── cleanup ─────────────────────────────────────────────────────

    /// Prune stopped containers and unused volumes host-wide.
    pub fn cleanup(&self) {
        self.reporter.info("Cleaning up unused Docker resources...");

        self.reporter.info("Removing stopped containers...");
        if let Err(e) = self.compose.container_prune() {
            self.reporter
                .warning(&format!("Failed to prune containers: {e}"));
        }

        self.reporter.info("Removing unused volumes...");
        if let Err(e) = self.compose.volume_prune() {
            self.reporter
                .warning(&format!("Failed to prune volumes: {e}"));
        }

        self.reporter.success("Cleanup completed.");
    }

    // ── inspection ──────────────────────────────────────────────────

    /// Stream logs of the instance, or of one of its services.
    pub fn logs(
        &self,
        name: &InstanceName,
        service: Option<ServiceKind>,
        follow: bool,
    ) -> LifecycleResult<()> {
        self.ensure_exists(name)?;
        self.compose
            .logs(name.as_str(), service.as_ref().map(ServiceKind::as_str), follow)
            .map_err(|e| LifecycleError::executor("show logs of", name.as_str(), e))
    }

    /// Live containers plus the registry's last-known records.
    ///
    /// A registry failure degrades to an empty record list.
    pub fn status(&self, name: &InstanceName) -> LifecycleResult<InstanceStatus> {
        self.ensure_exists(name)?;
        let containers = self
            .registry
            .live_containers(name.as_str())
            .map_err(|e| LifecycleError::executor("inspect", name.as_str(), e))?;
        let records = self
            .registry
            .list_containers(name.as_str())
            .unwrap_or_else(|e| {
                self.reporter
                    .warning(&format!("Failed to read container records: {e}"));
                Vec::new()
            });
        Ok(InstanceStatus {
            name: name.clone(),
            containers,
            records,
        })
    }

    /// Recorded instances joined with live engine state.
    ///
    /// Unrecorded projects show up only when their containers follow the
    /// `<name>-<service>` naming of this tool.
    pub fn list(&self) -> LifecycleResult<Vec<InstanceSummary>> {
        let mut summaries: BTreeMap<String, InstanceSummary> = BTreeMap::new();

        let records = self.registry.list_all().unwrap_or_else(|e| {
            self.reporter
                .warning(&format!("Failed to read the instance registry: {e}"));
            Vec::new()
        });
        for record in records {
            summaries
                .entry(record.instance_name.clone())
                .or_insert_with(|| InstanceSummary {
                    name: record.instance_name.clone(),
                    repository_path: Some(record.repository_path.clone()),
                    ports: Some(record.ports),
                    containers: Vec::new(),
                    recorded: true,
                });
        }

        let live = self
            .compose
            .labelled_containers()
            .map_err(|e| LifecycleError::executor("list", "containers", e))?;
        for (project, container) in live {
            let known = summaries.contains_key(&project);
            if !known && !is_stack_container(&project, &container.name) {
                continue;
            }
            summaries
                .entry(project.clone())
                .or_insert_with(|| InstanceSummary {
                    name: project,
                    repository_path: None,
                    ports: None,
                    containers: Vec::new(),
                    recorded: false,
                })
                .containers
                .push(container);
        }

        Ok(summaries.into_values().collect())
    }

    /// Availability of the triple at each base, plus the first free triple
    /// from the default base.
    pub fn port_report(&self, bases: &[u16]) -> LifecycleResult<PortReport> {
        let candidates = bases
            .iter()
            .filter_map(|base| self.allocator.inspect(*base))
            .collect();
        let next_available = self
            .allocator
            .allocate_avoiding(None, &self.reserved_ports(None))?;
        Ok(PortReport {
            candidates,
            next_available,
        })
    }
}

/// Absolute form of the repository path, without following symlinks so the
/// generated name comes from the path as given. `.` and `..` are folded
/// lexically.
fn resolve_repository(path: &Path) -> LifecycleResult<PathBuf> {
    let access = |source: std::io::Error| LifecycleError::RepositoryAccess {
        path: path.to_path_buf(),
        source,
    };
    if !path.try_exists().map_err(access)? {
        return Err(LifecycleError::RepositoryNotFound(path.to_path_buf()));
    }
    let absolute = std::path::absolute(path).map_err(access)?;

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

fn is_stack_container(project: &str, container: &str) -> bool {
    container
        .strip_prefix(project)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|service| service.parse::<ServiceKind>().is_ok())
}
