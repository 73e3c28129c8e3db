//! Shared types used across GraphSense crates.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::naming::InstanceName;
use crate::secrets::Secrets;

/// Offset of the relational database port from the app port.
pub const DATA_PORT_OFFSET: u16 = 100;

/// Offset of the graph database (Bolt) port from the app port.
pub const GRAPH_PORT_OFFSET: u16 = 200;

/// Port the application server listens on inside its container.
pub const APP_INTERNAL_PORT: u16 = 8080;

/// Compose label carrying the project name of a container.
pub const PROJECT_LABEL: &str = "com.docker.compose.project";

/// Environment variable that scopes compose commands to one project.
pub const PROJECT_ENV: &str = "COMPOSE_PROJECT_NAME";

// ── Ports ─────────────────────────────────────────────────────────

/// The three host ports published by one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortSet {
    /// Application server.
    pub app: u16,
    /// Relational database.
    pub data: u16,
    /// Graph database (Bolt).
    pub graph: u16,
}

impl PortSet {
    /// Derive the triple from a base port.
    ///
    /// Returns `None` when `base + GRAPH_PORT_OFFSET` would not fit in a port.
    pub fn from_base(base: u16) -> Option<Self> {
        Some(Self {
            app: base,
            data: base.checked_add(DATA_PORT_OFFSET)?,
            graph: base.checked_add(GRAPH_PORT_OFFSET)?,
        })
    }

    pub fn as_array(&self) -> [u16; 3] {
        [self.app, self.data, self.graph]
    }

    /// Whether any port of `self` is also claimed by `other`.
    pub fn overlaps(&self, other: &PortSet) -> bool {
        self.as_array()
            .iter()
            .any(|port| other.as_array().contains(port))
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app={} data={} graph={}", self.app, self.data, self.graph)
    }
}

// ── Services ──────────────────────────────────────────────────────

/// One of the three services in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    App,
    Postgres,
    Neo4j,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [ServiceKind::App, ServiceKind::Postgres, ServiceKind::Neo4j];

    /// Service key in the compose file, also the container-name suffix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::App => "app",
            ServiceKind::Postgres => "postgres",
            ServiceKind::Neo4j => "neo4j",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "app" => Ok(ServiceKind::App),
            "postgres" => Ok(ServiceKind::Postgres),
            "neo4j" => Ok(ServiceKind::Neo4j),
            other => Err(format!(
                "unknown service '{other}' (expected app, postgres, or neo4j)"
            )),
        }
    }
}

// ── Deploy configuration ──────────────────────────────────────────

/// Everything needed to render artifacts and record one deploy.
///
/// Built by the orchestrator for the duration of a single deploy call.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    /// Absolute path of the repository mounted into the app container.
    pub repository_path: PathBuf,
    pub name: InstanceName,
    pub ports: PortSet,
    pub secrets: Secrets,
}
