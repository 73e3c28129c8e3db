//! Credentials file loading.
//!
//! The secrets file is a dotenv-style key/value file. Only two keys are read;
//! anything else in the file is ignored.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

pub const CO_API_KEY: &str = "CO_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";

/// Optional API credentials passed through to the app container.
///
/// Empty values are normalized to `None`. `Debug` never prints the values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub co_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl Secrets {
    /// Load credentials from `path`.
    ///
    /// A missing file is an error; a missing key is not.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::SecretsMissing(path.to_path_buf()));
        }

        let iter = dotenvy::from_path_iter(path).map_err(|e| ConfigError::Secrets {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut secrets = Secrets::default();
        for item in iter {
            let (key, value) = item.map_err(|e| ConfigError::Secrets {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            match key.trim() {
                CO_API_KEY => secrets.co_api_key = non_empty(value),
                ANTHROPIC_API_KEY => secrets.anthropic_api_key = non_empty(value),
                _ => {}
            }
        }

        debug!(
            ?path,
            co_api_key = secrets.co_api_key.is_some(),
            anthropic_api_key = secrets.anthropic_api_key.is_some(),
            "secrets loaded"
        );
        Ok(secrets)
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("co_api_key", &redact(&self.co_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .finish()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
