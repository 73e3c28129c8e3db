//! Instance naming rules.
//!
//! An instance name is the isolation key for everything the compose engine
//! creates: the project name, container names, volumes, and the network.
//! Names are restricted to lowercase ASCII alphanumerics separated by single
//! hyphens, so two distinct names can never produce colliding resources.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::ServiceKind;

/// Prefix for names generated from a repository directory.
pub const GENERATED_NAME_PREFIX: &str = "graphsense";

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]+").expect("static regex"));

/// A sanitized instance name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceName(String);

impl InstanceName {
    /// Sanitize an operator-supplied name.
    ///
    /// Fails only when nothing usable remains (e.g. `"---"` or `"!!"`).
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let sanitized = sanitize(raw);
        if sanitized.is_empty() {
            return Err(ConfigError::InvalidInstanceName(raw.to_string()));
        }
        Ok(Self(sanitized))
    }

    /// Derive a name from the final component of a repository path.
    ///
    /// `/home/me/My Repo` becomes `graphsense-my-repo`. Only the last path
    /// component participates, so the result is stable for a given directory
    /// name regardless of where it lives.
    pub fn from_repository(path: &Path) -> Self {
        let base = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self(sanitize(&format!("{GENERATED_NAME_PREFIX}-{base}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Container name for one of the stack's services: `<name>-<service>`.
    pub fn container_name(&self, service: ServiceKind) -> String {
        format!("{}-{}", self.0, service.as_str())
    }

    /// Container names for the whole stack, in `ServiceKind::ALL` order.
    pub fn container_names(&self) -> Vec<String> {
        ServiceKind::ALL
            .iter()
            .map(|service| self.container_name(*service))
            .collect()
    }

    /// Named volume: `<name>_<suffix>`.
    pub fn volume_name(&self, suffix: &str) -> String {
        format!("{}_{suffix}", self.0)
    }

    /// Prefix shared by every volume of this instance.
    pub fn volume_prefix(&self) -> String {
        format!("{}_", self.0)
    }

    /// The instance's private bridge network: `<name>-network`.
    pub fn network_name(&self) -> String {
        format!("{}-network", self.0)
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InstanceName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InstanceName> for String {
    fn from(name: InstanceName) -> Self {
        name.0
    }
}

fn sanitize(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    DISALLOWED
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
