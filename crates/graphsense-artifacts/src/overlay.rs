//! Compose overlay that isolates one instance.
//!
//! Layered over the shared base compose file with a second `-f`. It only
//! overrides what must differ between instances: container names, volume
//! names, the network, and the published app port.

use std::collections::BTreeMap;

use graphsense_core::{APP_INTERNAL_PORT, InstanceConfig, InstanceName, ServiceKind};
use serde::Serialize;

use crate::env_file::{POSTGRES_PASSWORD, POSTGRES_USER};
use crate::error::{ArtifactError, ArtifactResult};

/// Compose file format version written into the overlay.
pub const COMPOSE_VERSION: &str = "3.8";

/// Where the repository is mounted inside the app container.
pub const REPO_MOUNT: &str = "/home/repo";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeOverlay {
    pub version: String,
    pub services: OverlayServices,
    pub networks: BTreeMap<String, NetworkSpec>,
    pub volumes: BTreeMap<String, VolumeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayServices {
    pub postgres: ServiceOverride,
    pub neo4j: ServiceOverride,
    pub app: ServiceOverride,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceOverride {
    pub container_name: String,
    pub volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    pub networks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSpec {
    pub driver: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSpec {
    pub name: String,
}

/// Named volumes and their mount points, per service.
const POSTGRES_VOLUMES: &[(&str, &str)] = &[("postgres_data", "/var/lib/postgresql/data")];
const NEO4J_VOLUMES: &[(&str, &str)] = &[
    ("neo4j_data", "/data"),
    ("neo4j_logs", "/logs"),
    ("neo4j_plugins", "/plugins"),
    ("neo4j_conf", "/conf"),
];
const APP_VOLUMES: &[(&str, &str)] = &[("app_repos", "/app/.graphsense")];

impl ComposeOverlay {
    pub fn for_instance(config: &InstanceConfig) -> Self {
        let name = &config.name;
        let network = name.network_name();

        let mut app = service(name, ServiceKind::App, APP_VOLUMES, &network);
        app.volumes
            .push(format!("{}:{REPO_MOUNT}:ro", config.repository_path.display()));
        app.ports = vec![format!("{}:{APP_INTERNAL_PORT}", config.ports.app)];
        app.environment = vec![
            format!(
                "POSTGRES_URL=postgresql://{POSTGRES_USER}:{POSTGRES_PASSWORD}@{}:5432/${{POSTGRES_DB}}",
                name.container_name(ServiceKind::Postgres)
            ),
            format!(
                "NEO4J_URI=bolt://{}:7687",
                name.container_name(ServiceKind::Neo4j)
            ),
            format!("LOCAL_REPO_PATH={REPO_MOUNT}"),
        ];

        let volumes = [POSTGRES_VOLUMES, NEO4J_VOLUMES, APP_VOLUMES]
            .iter()
            .flat_map(|set| set.iter())
            .map(|(suffix, _)| {
                let volume = name.volume_name(suffix);
                (volume.clone(), VolumeSpec { name: volume })
            })
            .collect();

        Self {
            version: COMPOSE_VERSION.to_string(),
            services: OverlayServices {
                postgres: service(name, ServiceKind::Postgres, POSTGRES_VOLUMES, &network),
                neo4j: service(name, ServiceKind::Neo4j, NEO4J_VOLUMES, &network),
                app,
            },
            networks: BTreeMap::from([(
                network,
                NetworkSpec {
                    driver: "bridge".to_string(),
                },
            )]),
            volumes,
        }
    }

    pub fn to_yaml(&self) -> ArtifactResult<String> {
        serde_yaml::to_string(self).map_err(|e| ArtifactError::Serialize(e.to_string()))
    }
}

fn service(
    name: &InstanceName,
    kind: ServiceKind,
    volumes: &[(&str, &str)],
    network: &str,
) -> ServiceOverride {
    ServiceOverride {
        container_name: name.container_name(kind),
        volumes: volumes
            .iter()
            .map(|(suffix, mount)| format!("{}:{mount}", name.volume_name(suffix)))
            .collect(),
        ports: Vec::new(),
        networks: vec![network.to_string()],
        environment: Vec::new(),
    }
}
