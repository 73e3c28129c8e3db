//! graphsense-core: shared vocabulary for the GraphSense instance tooling.
//!
//! Everything here is pure data or local file parsing: instance naming rules,
//! the port triple, the per-deploy configuration record, operator settings,
//! the secrets file, and the `Reporter` used to surface operator messages.

pub mod config;
pub mod error;
pub mod naming;
pub mod report;
pub mod secrets;
pub mod types;

pub use config::{HealthSettings, Settings};
pub use error::{ConfigError, ConfigResult};
pub use naming::InstanceName;
pub use report::{MemoryReporter, Reporter, Severity, TracingReporter};
pub use secrets::Secrets;
pub use types::*;
