//! Compose and docker verbs.

use std::path::Path;
use std::sync::Arc;

use graphsense_core::{PROJECT_ENV, PROJECT_LABEL, Settings};
use tracing::debug;

use crate::error::{ExecError, ExecResult};
use crate::runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};

const DEFAULT_COMPOSE: &str = "docker-compose";
const DEFAULT_DOCKER: &str = "docker";

/// Format string for `docker ps` rows: name, status, ports.
const CONTAINER_FORMAT: &str = "{{.Names}}\t{{.Status}}\t{{.Ports}}";

/// One row of `docker ps` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,
    pub status: String,
    pub ports: String,
}

impl ContainerSummary {
    /// Docker reports running containers as `Up <duration>`.
    pub fn is_up(&self) -> bool {
        self.status.starts_with("Up")
    }

    fn parse_rows(stdout: &str) -> Vec<Self> {
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let mut fields = line.splitn(3, '\t');
                Self {
                    name: fields.next().unwrap_or_default().trim().to_string(),
                    status: fields.next().unwrap_or_default().trim().to_string(),
                    ports: fields.next().unwrap_or_default().trim().to_string(),
                }
            })
            .collect()
    }
}

/// The compose engine, driven through a [`CommandRunner`].
#[derive(Clone)]
pub struct DockerCompose {
    runner: Arc<dyn CommandRunner>,
    compose_command: Vec<String>,
    docker_command: String,
}

impl DockerCompose {
    /// An empty `compose_command` falls back to `docker-compose`.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        compose_command: Vec<String>,
        docker_command: impl Into<String>,
    ) -> Self {
        let compose_command = if compose_command.is_empty() {
            vec![DEFAULT_COMPOSE.to_string()]
        } else {
            compose_command
        };
        let docker_command = docker_command.into();
        Self {
            runner,
            compose_command,
            docker_command: if docker_command.is_empty() {
                DEFAULT_DOCKER.to_string()
            } else {
                docker_command
            },
        }
    }

    pub fn from_settings(settings: &Settings, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(
            runner,
            settings.compose_command.clone(),
            settings.docker_command.clone(),
        )
    }

    /// Real processes, configured from settings.
    pub fn system(settings: &Settings) -> Self {
        Self::from_settings(settings, Arc::new(SystemRunner))
    }

    fn compose(&self, project: &str) -> CommandSpec {
        let spec = match self.compose_command.split_first() {
            Some((program, leading)) => {
                CommandSpec::new(program.as_str()).args(leading.iter().cloned())
            }
            None => CommandSpec::new(DEFAULT_COMPOSE),
        };
        spec.env(PROJECT_ENV, project)
    }

    fn docker(&self) -> CommandSpec {
        CommandSpec::new(self.docker_command.as_str())
    }

    /// Run and turn a non-zero exit into [`ExecError::Failed`].
    fn checked(&self, spec: CommandSpec) -> ExecResult<CommandOutput> {
        let output = self.runner.run(&spec)?;
        if output.is_success() {
            Ok(output)
        } else {
            debug!(command = %spec, code = ?output.code, "command failed");
            Err(ExecError::Failed {
                command: spec.to_string(),
                code: output.code,
            })
        }
    }

    /// `up -d` with the base compose file, the instance overlay, and its env file.
    pub fn up(
        &self,
        project: &str,
        base_file: &Path,
        overlay: &Path,
        env_file: &Path,
    ) -> ExecResult<()> {
        let spec = self.compose(project).args([
            "-f".to_string(),
            base_file.display().to_string(),
            "-f".to_string(),
            overlay.display().to_string(),
            "--env-file".to_string(),
            env_file.display().to_string(),
            "up".to_string(),
            "-d".to_string(),
        ]);
        self.checked(spec).map(drop)
    }

    pub fn stop(&self, project: &str) -> ExecResult<()> {
        self.checked(self.compose(project).arg("stop")).map(drop)
    }

    pub fn start(&self, project: &str) -> ExecResult<()> {
        self.checked(self.compose(project).arg("start")).map(drop)
    }

    /// `down -v --remove-orphans`: containers, network, and declared volumes.
    pub fn down(&self, project: &str) -> ExecResult<()> {
        let spec = self
            .compose(project)
            .args(["down", "-v", "--remove-orphans"]);
        self.checked(spec).map(drop)
    }

    /// Stream logs, optionally for one service.
    pub fn logs(&self, project: &str, service: Option<&str>, follow: bool) -> ExecResult<()> {
        let mut spec = self.compose(project).arg("logs");
        if follow {
            spec = spec.arg("-f");
        }
        if let Some(service) = service {
            spec = spec.arg(service);
        }
        self.checked(spec).map(drop)
    }

    /// Captured `ps` output of the project.
    pub fn ps(&self, project: &str) -> ExecResult<String> {
        self.checked(self.compose(project).arg("ps").captured())
            .map(|output| output.stdout)
    }

    fn label_filter(project: &str) -> String {
        format!("label={PROJECT_LABEL}={project}")
    }

    /// Containers carrying the project label, stopped ones included.
    pub fn project_containers(&self, project: &str) -> ExecResult<Vec<ContainerSummary>> {
        let spec = self
            .docker()
            .args(["ps", "-a", "--filter"])
            .arg(Self::label_filter(project))
            .args(["--format", CONTAINER_FORMAT])
            .captured();
        let output = self.checked(spec)?;
        Ok(ContainerSummary::parse_rows(&output.stdout))
    }

    /// Every container that belongs to some compose project, with its project name.
    pub fn labelled_containers(&self) -> ExecResult<Vec<(String, ContainerSummary)>> {
        let format = format!("{{{{.Label \"{PROJECT_LABEL}\"}}}}\t{CONTAINER_FORMAT}");
        let spec = self
            .docker()
            .args(["ps", "-a", "--filter"])
            .arg(format!("label={PROJECT_LABEL}"))
            .arg("--format")
            .arg(format)
            .captured();
        let output = self.checked(spec)?;
        Ok(output
            .stdout
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .flat_map(|(project, rest)| {
                ContainerSummary::parse_rows(rest)
                    .into_iter()
                    .map(move |summary| (project.trim().to_string(), summary))
            })
            .collect())
    }

    /// IDs of every container carrying the project label.
    pub fn container_ids(&self, project: &str) -> ExecResult<Vec<String>> {
        let spec = self
            .docker()
            .args(["ps", "-a", "-q", "--filter"])
            .arg(Self::label_filter(project))
            .captured();
        let output = self.checked(spec)?;
        Ok(non_empty_lines(&output.stdout))
    }

    /// `rm -f` the given containers. No-op for an empty list.
    pub fn force_remove(&self, ids: &[String]) -> ExecResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let spec = self.docker().args(["rm", "-f"]).args(ids.iter().cloned());
        self.checked(spec).map(drop)
    }

    /// Volume names starting with `prefix`.
    pub fn volumes_with_prefix(&self, prefix: &str) -> ExecResult<Vec<String>> {
        let spec = self.docker().args(["volume", "ls", "-q"]).captured();
        let output = self.checked(spec)?;
        Ok(non_empty_lines(&output.stdout)
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect())
    }

    /// `volume rm` the given volumes. No-op for an empty list.
    pub fn remove_volumes(&self, names: &[String]) -> ExecResult<()> {
        if names.is_empty() {
            return Ok(());
        }
        let spec = self
            .docker()
            .args(["volume", "rm"])
            .args(names.iter().cloned());
        self.checked(spec).map(drop)
    }

    pub fn container_prune(&self) -> ExecResult<()> {
        self.checked(self.docker().args(["container", "prune", "-f"]))
            .map(drop)
    }

    pub fn volume_prune(&self) -> ExecResult<()> {
        self.checked(self.docker().args(["volume", "prune", "-f"]))
            .map(drop)
    }
}

fn non_empty_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
