//! Readiness probe logic.
//!
//! Polls compose `ps` for the project at a fixed interval until a container
//! reports `Up` or the attempt budget runs out.

use std::thread;
use std::time::Duration;

use graphsense_core::{HealthSettings, Reporter};
use graphsense_executor::DockerCompose;
use tracing::debug;

/// Result of a single readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// `ps` listed at least one running container.
    Up,
    /// `ps` succeeded but nothing is running yet.
    NotUp,
    /// `ps` itself could not be executed or exited non-zero.
    Failed,
}

/// How long to wait for an instance to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl ReadinessPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    pub fn from_settings(settings: &HealthSettings) -> Self {
        Self::new(settings.attempts, settings.interval())
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::from_settings(&HealthSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// Came up on the given (1-based) attempt.
    Ready { attempts: u32 },
    /// Never reported `Up` within the policy.
    TimedOut { attempts: u32 },
}

impl ReadinessOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Run one probe against the project.
pub fn probe(compose: &DockerCompose, project: &str) -> ProbeResult {
    match compose.ps(project) {
        Ok(stdout) if stdout.contains("Up") => ProbeResult::Up,
        Ok(_) => ProbeResult::NotUp,
        Err(e) => {
            debug!(project, error = %e, "readiness probe failed");
            ProbeResult::Failed
        }
    }
}

/// Poll until the project reports a running container or attempts run out.
///
/// A failed probe counts as a not-ready attempt. No sleep follows the final
/// attempt.
pub fn wait_until_up(
    compose: &DockerCompose,
    project: &str,
    policy: &ReadinessPolicy,
    reporter: &dyn Reporter,
) -> ReadinessOutcome {
    reporter.info("Waiting for services to be ready...");

    for attempt in 1..=policy.attempts {
        let result = probe(compose, project);
        debug!(project, attempt, ?result, "readiness probe");
        if result == ProbeResult::Up {
            reporter.success("All services are running");
            return ReadinessOutcome::Ready { attempts: attempt };
        }

        if attempt < policy.attempts {
            reporter.info(&format!(
                "Waiting for services... ({attempt}/{})",
                policy.attempts
            ));
            thread::sleep(policy.interval);
        }
    }

    ReadinessOutcome::TimedOut {
        attempts: policy.attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphsense_core::{MemoryReporter, Severity};
    use graphsense_executor::{
        CommandOutput, CommandRunner, CommandSpec, ExecError, ExecResult,
    };
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays one scripted `ps` response per call; the last one repeats.
    struct PsScript {
        responses: Mutex<VecDeque<Option<&'static str>>>,
        calls: Mutex<u32>,
    }

    impl PsScript {
        fn new(responses: Vec<Option<&'static str>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl CommandRunner for PsScript {
        fn run(&self, spec: &CommandSpec) -> ExecResult<CommandOutput> {
            *self.calls.lock().unwrap() += 1;
            let mut responses = self.responses.lock().unwrap();
            let next = if responses.len() > 1 {
                responses.pop_front().flatten()
            } else {
                responses.front().copied().flatten()
            };
            match next {
                Some(stdout) => Ok(CommandOutput::success(stdout)),
                None => Err(ExecError::Spawn {
                    program: spec.program.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                }),
            }
        }
    }

    fn compose(script: Arc<PsScript>) -> DockerCompose {
        DockerCompose::new(script, vec!["docker-compose".to_string()], "docker")
    }

    const RUNNING: &str = "NAME STATUS\nalpha-app Up 3 seconds\n";
    const STARTING: &str = "NAME STATUS\nalpha-app Created\n";

    #[test]
    fn probe_classifies_ps_output() {
        assert_eq!(
            probe(&compose(PsScript::new(vec![Some(RUNNING)])), "alpha"),
            ProbeResult::Up
        );
        assert_eq!(
            probe(&compose(PsScript::new(vec![Some(STARTING)])), "alpha"),
            ProbeResult::NotUp
        );
        assert_eq!(
            probe(&compose(PsScript::new(vec![None])), "alpha"),
            ProbeResult::Failed
        );
    }

    #[test]
    fn ready_on_first_attempt() {
        let script = PsScript::new(vec![Some(RUNNING)]);
        let reporter = MemoryReporter::new();
        let outcome = wait_until_up(
            &compose(script.clone()),
            "alpha",
            &ReadinessPolicy::new(5, Duration::ZERO),
            &reporter,
        );
        assert_eq!(outcome, ReadinessOutcome::Ready { attempts: 1 });
        assert_eq!(script.calls(), 1);
        assert_eq!(
            reporter.messages(Severity::Success),
            vec!["All services are running".to_string()]
        );
    }

    #[test]
    fn failed_probes_count_as_attempts() {
        let script = PsScript::new(vec![None, Some(STARTING), Some(RUNNING)]);
        let reporter = MemoryReporter::new();
        let outcome = wait_until_up(
            &compose(script.clone()),
            "alpha",
            &ReadinessPolicy::new(5, Duration::ZERO),
            &reporter,
        );
        assert_eq!(outcome, ReadinessOutcome::Ready { attempts: 3 });
        assert_eq!(script.calls(), 3);
    }

    #[test]
    fn times_out_after_budget() {
        let script = PsScript::new(vec![Some(STARTING)]);
        let reporter = MemoryReporter::new();
        let outcome = wait_until_up(
            &compose(script.clone()),
            "alpha",
            &ReadinessPolicy::new(4, Duration::ZERO),
            &reporter,
        );
        assert_eq!(outcome, ReadinessOutcome::TimedOut { attempts: 4 });
        assert!(!outcome.is_ready());
        assert_eq!(script.calls(), 4);
        // One progress line between each pair of attempts.
        let progress = reporter
            .messages(Severity::Info)
            .into_iter()
            .filter(|m| m.starts_with("Waiting for services... ("))
            .count();
        assert_eq!(progress, 3);
    }

    #[test]
    fn zero_attempts_never_probes() {
        let script = PsScript::new(vec![Some(RUNNING)]);
        let outcome = wait_until_up(
            &compose(script.clone()),
            "alpha",
            &ReadinessPolicy::new(0, Duration::ZERO),
            &MemoryReporter::new(),
        );
        assert_eq!(outcome, ReadinessOutcome::TimedOut { attempts: 0 });
        assert_eq!(script.calls(), 0);
    }

    #[test]
    fn default_policy_matches_settings() {
        let policy = ReadinessPolicy::default();
        assert_eq!(policy.attempts, 60);
        assert_eq!(policy.interval, Duration::from_secs(5));
    }
}
