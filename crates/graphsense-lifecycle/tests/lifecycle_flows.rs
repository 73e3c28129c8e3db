//! End-to-end lifecycle flows against a simulated compose engine.
//!
//! `FakeEngine` keeps containers and volumes in memory and answers the same
//! docker / docker-compose invocations the real engine would receive.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use graphsense_core::{InstanceName, MemoryReporter, PortSet, Reporter, ServiceKind, Settings};
use graphsense_executor::{CommandOutput, CommandRunner, CommandSpec, DockerCompose, ExecResult};
use graphsense_health::ReadinessOutcome;
use graphsense_lifecycle::*;
use graphsense_ports::{PortAllocator, PortProbe};
use graphsense_state::StateStore;
use tempfile::TempDir;

const LABEL_FILTER: &str = "label=com.docker.compose.project";

#[derive(Default)]
struct EngineState {
    /// container name -> (project, running)
    containers: BTreeMap<String, (String, bool)>,
    volumes: BTreeSet<String>,
    calls: Vec<String>,
    /// Verbs that exit non-zero: up, down, stop, start, ps, logs, query, prune.
    failing: HashSet<&'static str>,
}

#[derive(Default)]
struct FakeEngine {
    state: Mutex<EngineState>,
}

impl FakeEngine {
    fn fail(&self, verb: &'static str) {
        self.state.lock().unwrap().failing.insert(verb);
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn calls_matching(&self, needle: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(needle)).count()
    }

    fn volumes(&self) -> Vec<String> {
        self.state.lock().unwrap().volumes.iter().cloned().collect()
    }

    fn running(&self, container: &str) -> Option<bool> {
        self.state
            .lock()
            .unwrap()
            .containers
            .get(container)
            .map(|(_, up)| *up)
    }

    /// Add a container the orchestrator did not create.
    fn adopt(&self, project: &str, container: &str) {
        self.state
            .lock()
            .unwrap()
            .containers
            .insert(container.to_string(), (project.to_string(), true));
    }

    /// Drop every container of a project behind the orchestrator's back.
    fn forget(&self, project: &str) {
        self.state
            .lock()
            .unwrap()
            .containers
            .retain(|_, (p, _)| *p != project);
    }
}

fn status_of(up: bool) -> &'static str {
    if up { "Up 5 seconds" } else { "Exited (0) 2 seconds ago" }
}

impl CommandRunner for FakeEngine {
    fn run(&self, spec: &CommandSpec) -> ExecResult<CommandOutput> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(spec.to_string());
        let args: Vec<&str> = spec.args.iter().map(String::as_str).collect();

        if spec.program == "docker-compose" {
            let project = spec
                .env_value("COMPOSE_PROJECT_NAME")
                .unwrap_or_default()
                .to_string();
            let verb = args
                .iter()
                .copied()
                .find(|a| matches!(*a, "up" | "down" | "stop" | "start" | "logs" | "ps"))
                .unwrap_or_default();
            if state.failing.contains(verb) {
                return Ok(CommandOutput::failure(1));
            }
            match verb {
                "up" => {
                    for service in ServiceKind::ALL {
                        state
                            .containers
                            .insert(format!("{project}-{service}"), (project.clone(), true));
                    }
                    for suffix in ["postgres_data", "neo4j_data", "neo4j_logs", "neo4j_plugins", "neo4j_conf", "app_repos"] {
                        state.volumes.insert(format!("{project}_{suffix}"));
                    }
                }
                "stop" | "start" => {
                    let up = verb == "start";
                    for (owner, running) in state.containers.values_mut() {
                        if *owner == project {
                            *running = up;
                        }
                    }
                }
                "down" => {
                    state.containers.retain(|_, (p, _)| *p != project);
                    let prefix = format!("{project}_");
                    state.volumes.retain(|v| !v.starts_with(&prefix));
                }
                "ps" => {
                    let rows: String = state
                        .containers
                        .iter()
                        .filter(|(_, (p, _))| *p == project)
                        .map(|(name, (_, up))| format!("{name}   {}\n", status_of(*up)))
                        .collect();
                    return Ok(CommandOutput::success(format!("NAME   STATUS\n{rows}")));
                }
                _ => {}
            }
            return Ok(CommandOutput::success(""));
        }

        let failing = |verb: &str| state.failing.contains(verb);
        match args.as_slice() {
            ["ps", "-a", "-q", "--filter", filter] => {
                if failing("query") {
                    return Ok(CommandOutput::failure(1));
                }
                let project = filter.trim_start_matches(LABEL_FILTER).trim_start_matches('=');
                let ids: String = state
                    .containers
                    .iter()
                    .filter(|(_, (p, _))| p == project)
                    .map(|(name, _)| format!("{name}\n"))
                    .collect();
                Ok(CommandOutput::success(ids))
            }
            ["ps", "-a", "--filter", filter, "--format", _] => {
                if failing("query") {
                    return Ok(CommandOutput::failure(1));
                }
                let rows: String = match filter.strip_prefix(&format!("{LABEL_FILTER}=")) {
                    Some(project) => state
                        .containers
                        .iter()
                        .filter(|(_, (p, _))| p == project)
                        .map(|(name, (_, up))| format!("{name}\t{}\t\n", status_of(*up)))
                        .collect(),
                    None => state
                        .containers
                        .iter()
                        .map(|(name, (p, up))| format!("{p}\t{name}\t{}\t\n", status_of(*up)))
                        .collect(),
                };
                Ok(CommandOutput::success(rows))
            }
            ["rm", "-f", ids @ ..] => {
                for id in ids {
                    state.containers.remove(*id);
                }
                Ok(CommandOutput::success(""))
            }
            ["volume", "ls", "-q"] => {
                let names: String = state.volumes.iter().map(|v| format!("{v}\n")).collect();
                Ok(CommandOutput::success(names))
            }
            ["volume", "rm", names @ ..] => {
                for name in names {
                    state.volumes.remove(*name);
                }
                Ok(CommandOutput::success(""))
            }
            ["container" | "volume", "prune", "-f"] => {
                if failing("prune") {
                    Ok(CommandOutput::failure(1))
                } else {
                    Ok(CommandOutput::success(""))
                }
            }
            other => panic!("unexpected docker invocation: {other:?}"),
        }
    }
}

/// Probe with a fixed set of occupied ports.
struct Occupied(HashSet<u16>);

impl PortProbe for Occupied {
    fn is_free(&self, port: u16) -> bool {
        !self.0.contains(&port)
    }
}

struct Harness {
    dir: TempDir,
    engine: Arc<FakeEngine>,
    reporter: Arc<MemoryReporter>,
    orchestrator: Orchestrator,
    repo: PathBuf,
}

impl Harness {
    fn artifact_dir(&self) -> PathBuf {
        self.dir.path().join("artifacts")
    }

    fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    fn deploy(&self, name: &str) -> LifecycleResult<DeployOutcome> {
        self.orchestrator
            .deploy(&DeployRequest::new(&self.repo).name(name))
    }

    fn warnings(&self) -> Vec<String> {
        self.reporter.warnings()
    }
}

#[derive(Default)]
struct Options {
    occupied: HashSet<u16>,
    registry_path: Option<PathBuf>,
    skip_secrets: bool,
    skip_compose_file: bool,
}

fn harness() -> Harness {
    harness_with(Options::default())
}

fn harness_with(options: Options) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("home");
    let repo = dir.path().join("repos").join("demo");
    let artifacts = dir.path().join("artifacts");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&repo).unwrap();
    std::fs::create_dir_all(&artifacts).unwrap();

    let compose_file = dir.path().join("docker-compose.yml");
    if !options.skip_compose_file {
        std::fs::write(&compose_file, "services: {}\n").unwrap();
    }
    if !options.skip_secrets {
        std::fs::write(home.join(".env"), "CO_API_KEY=co-123\nANTHROPIC_API_KEY=\n").unwrap();
    }

    let mut settings = Settings::with_home(&home);
    settings.compose_file = Some(compose_file);
    settings.health.attempts = 3;
    settings.health.interval_secs = 0;

    let engine = Arc::new(FakeEngine::default());
    let compose = DockerCompose::from_settings(&settings, engine.clone());
    let registry = match &options.registry_path {
        Some(path) => InstanceRegistry::at_path(compose.clone(), path),
        None => InstanceRegistry::with_store(compose.clone(), StateStore::open_in_memory().unwrap()),
    };
    let allocator = PortAllocator::new(Arc::new(Occupied(options.occupied)));
    let reporter = Arc::new(MemoryReporter::new());
    let orchestrator = Orchestrator::new(
        settings,
        compose,
        registry,
        allocator,
        reporter.clone() as Arc<dyn Reporter>,
    )
    .with_artifact_dir(&artifacts);

    Harness {
        dir,
        engine,
        reporter,
        orchestrator,
        repo,
    }
}

fn name(raw: &str) -> InstanceName {
    InstanceName::parse(raw).unwrap()
}

fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

// ── deploy ──────────────────────────────────────────────────────────

#[test]
fn deploy_brings_up_isolated_stack() {
    let h = harness();
    let outcome = h.deploy("alpha").unwrap();

    assert_eq!(outcome.name.as_str(), "alpha");
    assert_eq!(outcome.ports, PortSet::from_base(8080).unwrap());
    assert_eq!(outcome.readiness, ReadinessOutcome::Ready { attempts: 1 });
    assert!(outcome.recorded);
    assert!(h.orchestrator.registry().exists("alpha"));

    let up = h
        .engine
        .calls()
        .into_iter()
        .find(|c| c.ends_with("up -d"))
        .unwrap();
    assert!(up.starts_with("docker-compose -f "));
    assert!(up.contains("docker-compose.yml -f "));
    assert!(up.contains("--env-file "));

    let records = h.orchestrator.registry().list_containers("alpha").unwrap();
    let containers: Vec<&str> = records.iter().map(|r| r.container_name.as_str()).collect();
    assert_eq!(containers, vec!["alpha-app", "alpha-neo4j", "alpha-postgres"]);
    assert!(records.iter().all(|r| r.repository_path == outcome.repository));

    assert!(dir_is_empty(&h.artifact_dir()), "artifacts must be deleted after deploy");
    assert!(h.warnings().is_empty());
}

#[test]
fn deploy_derives_name_from_repository() {
    let h = harness();
    let outcome = h.orchestrator.deploy(&DeployRequest::new(&h.repo)).unwrap();
    assert_eq!(outcome.name.as_str(), "graphsense-demo");
    assert!(h.orchestrator.registry().exists("graphsense-demo"));
}

#[test]
fn deploy_sanitizes_requested_name() {
    let h = harness();
    let outcome = h.deploy("My_Project!!").unwrap();
    assert_eq!(outcome.name.as_str(), "my-project");
}

#[test]
fn deploy_skips_occupied_base() {
    let h = harness_with(Options {
        occupied: HashSet::from([8080]),
        ..Options::default()
    });
    let outcome = h.deploy("alpha").unwrap();
    assert_eq!(outcome.ports, PortSet { app: 8090, data: 8190, graph: 8290 });
}

#[test]
fn deploy_honours_requested_base_port() {
    let h = harness();
    let outcome = h
        .orchestrator
        .deploy(&DeployRequest::new(&h.repo).name("alpha").base_port(9100))
        .unwrap();
    assert_eq!(outcome.ports.app, 9100);
}

#[test]
fn deploy_missing_repository_has_no_side_effects() {
    let h = harness();
    let err = h
        .orchestrator
        .deploy(&DeployRequest::new(h.dir.path().join("nope")).name("alpha"))
        .unwrap_err();

    assert!(matches!(err, LifecycleError::RepositoryNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(h.engine.calls().is_empty());
    assert!(!h.home().join("deploy.lock").exists());
}

#[test]
fn deploy_rejects_unusable_name() {
    let h = harness();
    let err = h.deploy("!!!").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(h.engine.calls().is_empty());
}

#[test]
fn deploy_requires_compose_file() {
    let h = harness_with(Options {
        skip_compose_file: true,
        ..Options::default()
    });
    let err = h.deploy("alpha").unwrap_err();
    assert!(matches!(err, LifecycleError::ComposeFileMissing(_)));
    assert!(h.engine.calls().is_empty());
}

#[test]
fn deploy_requires_secrets_file() {
    let h = harness_with(Options {
        skip_secrets: true,
        ..Options::default()
    });
    let err = h.deploy("alpha").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(err.to_string().contains("API keys file not found"));
    assert!(h.engine.calls().is_empty());
}

#[test]
fn deploy_rejects_existing_instance() {
    let h = harness();
    h.deploy("alpha").unwrap();
    let err = h.deploy("alpha").unwrap_err();

    assert!(matches!(err, LifecycleError::AlreadyExists(ref n) if n == "alpha"));
    assert_eq!(h.engine.calls_matching("up -d"), 1);
}

#[test]
fn deploy_engine_failure_is_fatal_and_leaves_no_artifacts() {
    let h = harness();
    h.engine.fail("up");
    let err = h.deploy("alpha").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Executor);
    assert!(err.to_string().starts_with("failed to deploy instance alpha"));
    assert!(dir_is_empty(&h.artifact_dir()));
    assert!(h.orchestrator.registry().list_containers("alpha").unwrap().is_empty());
}

#[test]
fn readiness_timeout_is_only_a_warning() {
    let h = harness();
    h.engine.fail("ps");
    let outcome = h.deploy("alpha").unwrap();

    assert_eq!(outcome.readiness, ReadinessOutcome::TimedOut { attempts: 3 });
    assert!(outcome.recorded);
    assert_eq!(h.engine.calls_matching("docker-compose ps"), 3);
    assert!(h.warnings().iter().any(|w| w.contains("Health check failed")));
}

#[test]
fn registry_failure_is_only_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness_with(Options {
        registry_path: Some(dir.path().join("missing").join("instances.redb")),
        ..Options::default()
    });
    let outcome = h.deploy("alpha").unwrap();

    assert!(!outcome.recorded);
    assert!(h.orchestrator.registry().exists("alpha"));
    assert!(
        h.warnings()
            .iter()
            .any(|w| w.starts_with("Failed to store container information"))
    );
}

#[test]
fn deploy_skips_ports_recorded_for_stopped_instance() {
    let h = harness();
    let alpha = h.deploy("alpha").unwrap();
    h.orchestrator.stop(&name("alpha")).unwrap();

    // Nothing is bound any more; only the registry remembers alpha's ports.
    let beta = h.deploy("beta").unwrap();
    assert!(!alpha.ports.overlaps(&beta.ports), "{} vs {}", alpha.ports, beta.ports);
    assert_eq!(beta.ports, PortSet::from_base(8090).unwrap());

    h.orchestrator.start(&name("alpha")).unwrap();
    let recorded = h.orchestrator.registry().list_containers("alpha").unwrap();
    assert!(recorded.iter().all(|r| r.ports == alpha.ports));
}

#[test]
fn explicit_base_inside_recorded_triple_moves_on() {
    let h = harness();
    h.deploy("alpha").unwrap();
    let beta = h
        .orchestrator
        .deploy(&DeployRequest::new(&h.repo).name("beta").base_port(8180))
        .unwrap();
    assert_eq!(beta.ports, PortSet::from_base(8190).unwrap());
}

#[test]
fn unreadable_registry_does_not_block_allocation() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness_with(Options {
        registry_path: Some(dir.path().join("missing").join("instances.redb")),
        ..Options::default()
    });
    let outcome = h.deploy("alpha").unwrap();
    assert_eq!(outcome.ports, PortSet::from_base(8080).unwrap());
    assert!(
        h.warnings()
            .iter()
            .any(|w| w.starts_with("Failed to read the instance registry"))
    );
}

#[cfg(unix)]
#[test]
fn generated_name_follows_symlink_name_not_target() {
    let h = harness();
    let link = h.dir.path().join("repos").join("my-link");
    std::os::unix::fs::symlink(&h.repo, &link).unwrap();

    let outcome = h.orchestrator.deploy(&DeployRequest::new(&link)).unwrap();
    assert_eq!(outcome.name.as_str(), "graphsense-my-link");
    assert_eq!(outcome.repository, link);
}

#[test]
fn relative_repository_segments_are_folded() {
    let h = harness();
    let winding = h.repo.join("..").join(".").join("demo");
    let outcome = h.orchestrator.deploy(&DeployRequest::new(&winding)).unwrap();
    assert_eq!(outcome.name.as_str(), "graphsense-demo");
    assert_eq!(outcome.repository, h.repo);
}

// ── stop / start ────────────────────────────────────────────────────

#[test]
fn stop_then_start() {
    let h = harness();
    h.deploy("alpha").unwrap();

    h.orchestrator.stop(&name("alpha")).unwrap();
    assert_eq!(h.engine.running("alpha-app"), Some(false));
    assert!(h.orchestrator.registry().exists("alpha"), "stopped containers still exist");

    h.orchestrator.start(&name("alpha")).unwrap();
    assert_eq!(h.engine.running("alpha-neo4j"), Some(true));
}

#[test]
fn stop_unknown_instance_is_precondition_error() {
    let h = harness();
    let err = h.orchestrator.stop(&name("ghost")).unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound(ref n) if n == "ghost"));
    assert_eq!(h.engine.calls_matching("docker-compose"), 0);
}

#[test]
fn start_engine_failure_is_reported() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.engine.fail("start");
    let err = h.orchestrator.start(&name("alpha")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Executor);
}

#[test]
fn failed_existence_query_counts_as_absent() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.engine.fail("query");
    assert!(!h.orchestrator.registry().exists("alpha"));
    assert!(matches!(
        h.orchestrator.stop(&name("alpha")),
        Err(LifecycleError::NotFound(_))
    ));
}

// ── remove ──────────────────────────────────────────────────────────

#[test]
fn remove_tears_everything_down() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.deploy_other("alpha-2");

    let outcome = h.orchestrator.remove(&name("alpha"), &AssumeYes).unwrap();

    assert_eq!(
        outcome,
        RemoveOutcome::Removed {
            swept: false,
            volumes_removed: 0,
            records_removed: Some(3),
        }
    );
    assert!(!h.orchestrator.registry().exists("alpha"));
    assert!(h.engine.volumes().iter().all(|v| v.starts_with("alpha-2_")));
    assert!(h.orchestrator.registry().exists("alpha-2"));
    assert_eq!(h.orchestrator.registry().list_containers("alpha-2").unwrap().len(), 3);
}

#[test]
fn remove_falls_back_to_manual_sweep() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.engine.fail("down");

    let outcome = h.orchestrator.remove(&name("alpha"), &AssumeYes).unwrap();

    assert_eq!(
        outcome,
        RemoveOutcome::Removed {
            swept: true,
            volumes_removed: 6,
            records_removed: Some(3),
        }
    );
    assert!(!h.orchestrator.registry().exists("alpha"));
    assert!(h.engine.volumes().is_empty());
    assert_eq!(h.engine.calls_matching("docker rm -f"), 1);
    assert!(h.warnings().iter().any(|w| w.contains("trying manual cleanup")));
}

#[test]
fn remove_twice_clears_records_once() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.orchestrator.remove(&name("alpha"), &AssumeYes).unwrap();

    assert_eq!(h.orchestrator.registry().remove_all("alpha").unwrap(), 0);
    assert!(matches!(
        h.orchestrator.remove(&name("alpha"), &AssumeYes),
        Err(LifecycleError::NotFound(_))
    ));
}

#[test]
fn declined_remove_touches_nothing() {
    let h = harness();
    h.deploy("alpha").unwrap();
    let before = h.engine.calls().len();

    let outcome = h.orchestrator.remove(&name("alpha"), &AssumeNo).unwrap();

    assert_eq!(outcome, RemoveOutcome::Cancelled);
    // Only the existence query ran.
    assert_eq!(h.engine.calls().len(), before + 1);
    assert!(h.orchestrator.registry().exists("alpha"));
    assert_eq!(h.orchestrator.registry().list_containers("alpha").unwrap().len(), 3);
}

#[test]
fn remove_with_broken_registry_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness_with(Options {
        registry_path: Some(dir.path().join("missing").join("instances.redb")),
        ..Options::default()
    });
    h.deploy("alpha").unwrap();

    let outcome = h.orchestrator.remove(&name("alpha"), &AssumeYes).unwrap();
    assert!(matches!(
        outcome,
        RemoveOutcome::Removed {
            records_removed: None,
            ..
        }
    ));
    assert!(!h.orchestrator.registry().exists("alpha"));
}

// ── cleanup ─────────────────────────────────────────────────────────

#[test]
fn cleanup_prunes_and_tolerates_failures() {
    let h = harness();
    h.orchestrator.cleanup();
    assert_eq!(h.engine.calls_matching("prune -f"), 2);
    assert!(h.warnings().is_empty());

    h.engine.fail("prune");
    h.orchestrator.cleanup();
    assert_eq!(h.warnings().len(), 2);
}

// ── inspection ──────────────────────────────────────────────────────

#[test]
fn logs_scoped_to_service() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.orchestrator
        .logs(&name("alpha"), Some(ServiceKind::Neo4j), true)
        .unwrap();
    h.orchestrator.logs(&name("alpha"), None, false).unwrap();

    let calls = h.engine.calls();
    assert!(calls.contains(&"docker-compose logs -f neo4j".to_string()));
    assert!(calls.contains(&"docker-compose logs".to_string()));
    assert!(matches!(
        h.orchestrator.logs(&name("ghost"), None, true),
        Err(LifecycleError::NotFound(_))
    ));
}

#[test]
fn status_joins_live_and_recorded() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.orchestrator.stop(&name("alpha")).unwrap();

    let status = h.orchestrator.status(&name("alpha")).unwrap();
    assert_eq!(status.containers.len(), 3);
    assert!(status.containers.iter().all(|c| !c.is_up()));
    assert_eq!(status.records.len(), 3);
    assert_eq!(status.records[0].ports.app, 8080);
}

#[test]
fn list_flags_drift_and_untracked_projects() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.deploy_other("beta");
    h.engine.forget("beta");
    h.engine.adopt("manual", "manual-app");
    h.engine.adopt("unrelated", "unrelated-redis");

    let summaries = h.orchestrator.list().unwrap();
    let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "manual"]);

    assert!(summaries[0].recorded && !summaries[0].is_drifted());
    assert_eq!(summaries[0].running(), 3);
    assert_eq!(summaries[0].ports, Some(PortSet::from_base(8080).unwrap()));

    assert!(summaries[1].is_drifted());

    assert!(!summaries[2].recorded);
    assert_eq!(summaries[2].containers.len(), 1);
    assert!(summaries[2].ports.is_none());
}

#[test]
fn port_report_marks_conflicts() {
    let h = harness_with(Options {
        occupied: HashSet::from([8080, 8190]),
        ..Options::default()
    });
    let report = h.orchestrator.port_report(&[8080, 8090, 8100]).unwrap();

    assert_eq!(report.candidates.len(), 3);
    assert!(!report.candidates[0].app_free);
    assert!(report.candidates[0].data_free);
    assert!(!report.candidates[1].data_free);
    assert!(report.candidates[2].is_available());
    assert_eq!(report.next_available, PortSet::from_base(8100).unwrap());
}

#[test]
fn port_report_recommends_past_recorded_instances() {
    let h = harness();
    h.deploy("alpha").unwrap();
    h.orchestrator.stop(&name("alpha")).unwrap();

    let report = h.orchestrator.port_report(&[8080]).unwrap();
    assert!(report.candidates[0].is_available(), "nothing is bound");
    assert_eq!(report.next_available, PortSet::from_base(8090).unwrap());
}

impl Harness {
    /// Deploy a second instance on a non-overlapping base.
    fn deploy_other(&self, raw: &str) {
        self.orchestrator
            .deploy(&DeployRequest::new(&self.repo).name(raw).base_port(9000))
            .unwrap();
    }
}
