//! graphsense-executor: the container engine as an external process.
//!
//! Every engine interaction is a [`CommandSpec`] handed to a [`CommandRunner`].
//! [`SystemRunner`] spawns real processes; tests substitute their own runner.
//! [`DockerCompose`] builds the compose and docker verbs on top of a runner,
//! scoping compose calls to one project through `COMPOSE_PROJECT_NAME`.

pub mod compose;
pub mod error;
pub mod runner;

pub use compose::{ContainerSummary, DockerCompose};
pub use error::{ExecError, ExecResult};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
