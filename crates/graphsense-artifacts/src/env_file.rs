//! The compose `--env-file` for one instance.

use std::fmt;
use std::path::PathBuf;

use graphsense_core::secrets::{ANTHROPIC_API_KEY, CO_API_KEY};
use graphsense_core::{InstanceConfig, PortSet};

pub const POSTGRES_DB: &str = "graphsense";
pub const POSTGRES_USER: &str = "postgres";
pub const POSTGRES_PASSWORD: &str = "postgres";
pub const NEO4J_USERNAME: &str = "neo4j";

/// Fixed security defaults for the app service.
pub const CORS_ORIGIN: &str = "*";
pub const RATE_LIMIT_MAX: u32 = 100;
pub const RATE_LIMIT_WINDOW_MS: u32 = 900_000;

/// Typed view of the environment file.
///
/// Rendered through `Display`; each value comes from a named field.
#[derive(Debug, Clone)]
pub struct EnvironmentFile {
    pub repository_path: PathBuf,
    pub ports: PortSet,
    pub co_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

enum Line {
    Section(&'static str),
    Var(&'static str, String),
    Blank,
}

impl EnvironmentFile {
    pub fn from_config(config: &InstanceConfig) -> Self {
        Self {
            repository_path: config.repository_path.clone(),
            ports: config.ports,
            co_api_key: config.secrets.co_api_key.clone(),
            anthropic_api_key: config.secrets.anthropic_api_key.clone(),
        }
    }

    fn lines(&self) -> Vec<Line> {
        let mut lines = vec![
            Line::Section("Repository Configuration"),
            Line::Var("REPO_PATH", self.repository_path.display().to_string()),
            Line::Blank,
            Line::Section("Port Configuration"),
            Line::Var("PORT", self.ports.app.to_string()),
            Line::Var("POSTGRES_PORT", self.ports.data.to_string()),
            Line::Var("NEO4J_BOLT_PORT", self.ports.graph.to_string()),
            Line::Blank,
            Line::Section("Database Configuration"),
            Line::Var("POSTGRES_DB", POSTGRES_DB.to_string()),
            Line::Var("POSTGRES_USER", POSTGRES_USER.to_string()),
            Line::Var("POSTGRES_PASSWORD", POSTGRES_PASSWORD.to_string()),
            Line::Blank,
            Line::Section("Neo4j Configuration"),
            Line::Var("NEO4J_AUTH", "none".to_string()),
            Line::Var("NEO4J_USERNAME", NEO4J_USERNAME.to_string()),
            Line::Var("NEO4J_PASSWORD", String::new()),
            Line::Blank,
            Line::Section("Application Configuration"),
            Line::Var("NODE_ENV", "production".to_string()),
            Line::Var("LOG_LEVEL", "info".to_string()),
            Line::Var("INDEX_FROM_SCRATCH", "true".to_string()),
            Line::Blank,
            Line::Section("Security Configuration"),
            Line::Var("CORS_ORIGIN", CORS_ORIGIN.to_string()),
            Line::Var("RATE_LIMIT_MAX", RATE_LIMIT_MAX.to_string()),
            Line::Var("RATE_LIMIT_WINDOW", RATE_LIMIT_WINDOW_MS.to_string()),
        ];

        if let Some(key) = self.co_api_key.as_deref().filter(|k| !k.is_empty()) {
            lines.push(Line::Var(CO_API_KEY, key.to_string()));
        }
        if let Some(key) = self.anthropic_api_key.as_deref().filter(|k| !k.is_empty()) {
            lines.push(Line::Var(ANTHROPIC_API_KEY, key.to_string()));
        }
        lines
    }
}

impl fmt::Display for EnvironmentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            match line {
                Line::Section(title) => writeln!(f, "# {title}")?,
                Line::Var(key, value) => writeln!(f, "{key}={value}")?,
                Line::Blank => writeln!(f)?,
            }
        }
        Ok(())
    }
}
