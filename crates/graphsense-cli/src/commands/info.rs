//! `graphsense list | logs | status | debug`.

use graphsense_core::{PortSet, ServiceKind};
use graphsense_lifecycle::{InstanceSummary, Orchestrator};
use serde_json::json;
use tracing::info;

use super::instance_name;

/// Bases shown by `debug`.
const DEBUG_BASES: [u16; 5] = [8080, 8090, 8100, 8110, 8120];

pub fn list(orchestrator: &Orchestrator, format: &str) -> anyhow::Result<()> {
    let summaries = orchestrator.list()?;

    match format {
        "json" => {
            let rows: Vec<_> = summaries.iter().map(summary_json).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            info!("GraphSense Instances:");
            if summaries.is_empty() {
                info!("No instances found.");
                return Ok(());
            }
            println!(
                "{:<28} {:<10} {:<24} {}",
                "NAME", "STATE", "PORTS", "REPOSITORY"
            );
            for summary in &summaries {
                println!(
                    "{:<28} {:<10} {:<24} {}",
                    summary.name,
                    state_label(summary),
                    summary.ports.map(ports_label).unwrap_or_else(|| "-".into()),
                    summary
                        .repository_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "-".into()),
                );
            }
        }
    }
    Ok(())
}

fn state_label(summary: &InstanceSummary) -> String {
    if summary.is_drifted() {
        return "missing".to_string();
    }
    let label = format!("{}/{} up", summary.running(), summary.containers.len());
    if summary.recorded {
        label
    } else {
        format!("{label}*")
    }
}

fn ports_label(ports: PortSet) -> String {
    format!("{}/{}/{}", ports.app, ports.data, ports.graph)
}

fn summary_json(summary: &InstanceSummary) -> serde_json::Value {
    json!({
        "name": summary.name,
        "recorded": summary.recorded,
        "drifted": summary.is_drifted(),
        "repository_path": summary.repository_path,
        "ports": summary.ports.map(|p| json!({ "app": p.app, "data": p.data, "graph": p.graph })),
        "containers": summary.containers.iter().map(|c| json!({
            "name": c.name,
            "status": c.status,
            "ports": c.ports,
        })).collect::<Vec<_>>(),
    })
}

pub fn logs(
    orchestrator: &Orchestrator,
    name: &str,
    service: Option<ServiceKind>,
    follow: bool,
) -> anyhow::Result<()> {
    orchestrator.logs(&instance_name(name)?, service, follow)?;
    Ok(())
}

pub fn status(orchestrator: &Orchestrator, name: &str) -> anyhow::Result<()> {
    let status = orchestrator.status(&instance_name(name)?)?;

    info!("Container details:");
    println!("{:<28} {:<28} {}", "NAME", "STATUS", "PORTS");
    for container in &status.containers {
        println!(
            "{:<28} {:<28} {}",
            container.name, container.status, container.ports
        );
    }

    if let Some(record) = status.records.first() {
        println!();
        info!("Recorded deployment:");
        println!("  Repository: {}", record.repository_path.display());
        println!("  MCP Server: http://localhost:{}", record.ports.app);
        println!("  PostgreSQL: localhost:{}", record.ports.data);
        println!("  Neo4j Bolt: bolt://localhost:{}", record.ports.graph);
        println!("  Deployed:   {}", record.created_at.to_rfc3339());
    }
    Ok(())
}

pub fn debug(orchestrator: &Orchestrator) -> anyhow::Result<()> {
    info!("Port Usage Debug Information");

    info!("GraphSense compose projects:");
    let summaries = orchestrator.list()?;
    if summaries.is_empty() {
        println!("  No GraphSense compose projects detected");
    }
    for summary in &summaries {
        for container in &summary.containers {
            println!(
                "  {:<24} {:<28} {}",
                summary.name, container.name, container.ports
            );
        }
        if summary.is_drifted() {
            println!("  {:<24} (recorded, no containers)", summary.name);
        }
    }

    println!();
    info!("Available port ranges starting from common bases:");
    let report = orchestrator.port_report(&DEBUG_BASES)?;
    for candidate in &report.candidates {
        let ports = candidate.ports;
        if candidate.is_available() {
            println!(
                "  Base {}: AVAILABLE (App:{}, PG:{}, Neo4j:{})",
                ports.app, ports.app, ports.data, ports.graph
            );
        } else {
            let mut conflicts = Vec::new();
            if !candidate.app_free {
                conflicts.push(format!("APP:{}", ports.app));
            }
            if !candidate.data_free {
                conflicts.push(format!("PG:{}", ports.data));
            }
            if !candidate.graph_free {
                conflicts.push(format!("NEO4J-BOLT:{}", ports.graph));
            }
            println!("  Base {}: CONFLICTS - {}", ports.app, conflicts.join(" "));
        }
    }

    println!();
    info!("Next available base port:");
    let next = report.next_available;
    println!("  Recommended base port: {}", next.app);
    println!("  Ports that will be used:");
    println!("    - MCP Server: {}", next.app);
    println!("    - PostgreSQL: {}", next.data);
    println!("    - Neo4j Bolt: {}", next.graph);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphsense_lifecycle::ContainerSummary;
    use std::path::PathBuf;

    fn summary(recorded: bool, containers: usize) -> InstanceSummary {
        InstanceSummary {
            name: "alpha".into(),
            repository_path: Some(PathBuf::from("/repo")),
            ports: PortSet::from_base(8080),
            containers: (0..containers)
                .map(|i| ContainerSummary {
                    name: format!("alpha-{i}"),
                    status: if i == 0 { "Up 1 minute" } else { "Exited (0)" }.to_string(),
                    ports: String::new(),
                })
                .collect(),
            recorded,
        }
    }

    #[test]
    fn state_labels() {
        assert_eq!(state_label(&summary(true, 0)), "missing");
        assert_eq!(state_label(&summary(true, 3)), "1/3 up");
        assert_eq!(state_label(&summary(false, 1)), "1/1 up*");
    }

    #[test]
    fn json_rows_carry_drift_and_ports() {
        let value = summary_json(&summary(true, 0));
        assert_eq!(value["name"], "alpha");
        assert_eq!(value["drifted"], true);
        assert_eq!(value["ports"]["data"], 8180);
        assert_eq!(value["repository_path"], "/repo");
        assert!(value["containers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn ports_render_as_triple() {
        assert_eq!(ports_label(PortSet::from_base(8090).unwrap()), "8090/8190/8290");
    }
}
