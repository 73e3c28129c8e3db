//! Persisted record types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use graphsense_core::{InstanceConfig, PortSet};
use serde::{Deserialize, Serialize};

/// Last-known resource parameters of one container of an instance.
///
/// Secrets are never part of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub instance_name: String,
    pub container_name: String,
    pub repository_path: PathBuf,
    pub ports: PortSet,
    pub created_at: DateTime<Utc>,
}

impl InstanceRecord {
    /// One record per service container of a deploy, in service order.
    pub fn for_config(config: &InstanceConfig, created_at: DateTime<Utc>) -> Vec<Self> {
        config
            .name
            .container_names()
            .into_iter()
            .map(|container_name| Self {
                instance_name: config.name.to_string(),
                container_name,
                repository_path: config.repository_path.clone(),
                ports: config.ports,
                created_at,
            })
            .collect()
    }

    /// Composite key for the instances table.
    pub fn table_key(&self) -> String {
        table_key(&self.instance_name, &self.container_name)
    }
}

pub(crate) fn table_key(instance_name: &str, container_name: &str) -> String {
    format!("{instance_name}:{container_name}")
}

pub(crate) fn instance_prefix(instance_name: &str) -> String {
    format!("{instance_name}:")
}
