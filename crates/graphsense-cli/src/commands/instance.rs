//! `graphsense deploy | stop | start | remove`.

use std::path::PathBuf;

use graphsense_lifecycle::{AssumeYes, Confirm, DeployRequest, Orchestrator, RemoveOutcome};
use tracing::debug;

use super::instance_name;

/// Interactive y/N prompt on the terminal. Anything but an explicit yes declines.
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub fn deploy(
    orchestrator: &Orchestrator,
    repo_path: PathBuf,
    name: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let request = DeployRequest {
        repository: repo_path,
        name,
        base_port: port,
    };
    let outcome = orchestrator.deploy(&request)?;
    debug!(instance = %outcome.name, ports = %outcome.ports, "deploy finished");
    Ok(())
}

pub fn stop(orchestrator: &Orchestrator, name: &str) -> anyhow::Result<()> {
    orchestrator.stop(&instance_name(name)?)?;
    Ok(())
}

pub fn start(orchestrator: &Orchestrator, name: &str) -> anyhow::Result<()> {
    orchestrator.start(&instance_name(name)?)?;
    Ok(())
}

pub fn remove(orchestrator: &Orchestrator, name: &str, yes: bool) -> anyhow::Result<()> {
    let name = instance_name(name)?;
    let confirm: &dyn Confirm = if yes { &AssumeYes } else { &TerminalConfirm };
    match orchestrator.remove(&name, confirm)? {
        RemoveOutcome::Cancelled => {}
        RemoveOutcome::Removed {
            swept,
            volumes_removed,
            records_removed,
        } => debug!(
            instance = %name,
            swept,
            volumes_removed,
            ?records_removed,
            "remove finished"
        ),
    }
    Ok(())
}
