//! Operator settings (`config.toml` in the GraphSense home directory).
//!
//! Every key is optional; a missing file yields the defaults.
//!
//! ```toml
//! compose_file = "/opt/graphsense/docker-compose.yml"
//! compose_command = ["docker", "compose"]
//! default_base_port = 9000
//!
//! [health]
//! attempts = 30
//! interval_secs = 2
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable that relocates the GraphSense home directory.
pub const HOME_ENV: &str = "GRAPHSENSE_HOME";

/// Name of the settings file inside the home directory.
pub const SETTINGS_FILE: &str = "config.toml";

/// Default base port for the first instance.
pub const DEFAULT_BASE_PORT: u16 = 8080;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base compose file shared by every instance. Defaults to
    /// `~/oss/code-graph-rag/docker-compose.yml`.
    pub compose_file: Option<PathBuf>,
    /// Program (and leading args) that runs compose, e.g. `["docker", "compose"]`.
    pub compose_command: Vec<String>,
    /// Program used for container and volume queries.
    pub docker_command: String,
    pub default_base_port: u16,
    /// Registry database, relative to the home directory.
    pub registry_file: String,
    /// Secrets file, relative to the home directory.
    pub secrets_file: String,
    /// Deploy lock file, relative to the home directory.
    pub lock_file: String,
    pub health: HealthSettings,
    /// Resolved home directory. Not read from the file.
    #[serde(skip)]
    pub home: PathBuf,
}

/// Readiness polling after `up`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub attempts: u32,
    pub interval_secs: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            attempts: 60,
            interval_secs: 5,
        }
    }
}

impl HealthSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compose_file: None,
            compose_command: vec!["docker-compose".to_string()],
            docker_command: "docker".to_string(),
            default_base_port: DEFAULT_BASE_PORT,
            registry_file: "instances.redb".to_string(),
            secrets_file: ".env".to_string(),
            lock_file: "deploy.lock".to_string(),
            health: HealthSettings::default(),
            home: PathBuf::new(),
        }
    }
}

impl Settings {
    /// Load settings from the resolved home directory.
    ///
    /// The home is `$GRAPHSENSE_HOME` when set, otherwise `~/.graphsense`.
    pub fn load() -> ConfigResult<Self> {
        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDirectory)?
                .join(".graphsense"),
        };
        Self::load_from(&home)
    }

    /// Load settings rooted at an explicit home directory.
    pub fn load_from(home: &Path) -> ConfigResult<Self> {
        let path = home.join(SETTINGS_FILE);
        let mut settings = if path.is_file() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        settings.home = home.to_path_buf();
        debug!(home = ?settings.home, "settings loaded");
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Defaults rooted at `home` without reading anything (for testing).
    pub fn with_home(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            ..Self::default()
        }
    }

    /// Create the home directory if it is missing.
    pub fn ensure_home(&self) -> ConfigResult<()> {
        std::fs::create_dir_all(&self.home).map_err(|source| ConfigError::Io {
            path: self.home.clone(),
            source,
        })
    }

    pub fn registry_path(&self) -> PathBuf {
        self.home.join(&self.registry_file)
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.home.join(&self.secrets_file)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.home.join(&self.lock_file)
    }

    /// The base compose file, falling back to the conventional checkout location.
    pub fn compose_file_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.compose_file {
            return Ok(path.clone());
        }
        let user_home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(user_home
            .join("oss")
            .join("code-graph-rag")
            .join("docker-compose.yml"))
    }
}
