//! graphsense-lifecycle: instance lifecycle orchestration.
//!
//! Composes port allocation, artifact rendering, the compose engine, readiness
//! polling, and the registry into the operator-facing transitions:
//!
//! ```text
//! absent --deploy--> deployed --stop--> stopped --start--> deployed
//!    ^                   |                  |
//!    +------remove-------+------remove------+
//! ```
//!
//! Preconditions are checked before anything with side effects runs. Once
//! the compose engine has been invoked nothing is rolled back; bookkeeping
//! and readiness problems after that point are reported as warnings.

pub mod confirm;
pub mod error;
pub mod orchestrator;
pub mod registry;

pub use confirm::{AssumeNo, AssumeYes, Confirm};
pub use error::{ErrorKind, LifecycleError, LifecycleResult};
pub use orchestrator::{
    DeployOutcome, DeployRequest, InstanceStatus, InstanceSummary, Orchestrator, PortReport,
    RemoveOutcome,
};
pub use registry::InstanceRegistry;

pub use graphsense_executor::ContainerSummary;
