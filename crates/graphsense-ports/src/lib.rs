//! graphsense-ports: host port allocation for GraphSense instances.
//!
//! Each instance publishes three ports at fixed offsets from a base
//! (`app`, `app + 100`, `app + 200`). The allocator walks candidate bases
//! upward from the requested one until every port of a triple binds.
//!
//! Availability is advisory: a triple is free when checked, not when the
//! containers start. Callers that launch containers hold a [`DeployLock`]
//! across "allocate, then launch" so concurrent deploys on the same host
//! take turns.

pub mod allocator;
pub mod error;
pub mod lock;
pub mod probe;

pub use allocator::{MAX_BASE_PORT, PORT_STEP, PortAllocator, PortAvailability};
pub use error::{PortError, PortResult};
pub use lock::DeployLock;
pub use probe::{PortProbe, TcpBindProbe};
