//! Port triple allocation.

use std::sync::Arc;

use graphsense_core::PortSet;
use graphsense_core::config::DEFAULT_BASE_PORT;
use tracing::debug;

use crate::error::{PortError, PortResult};
use crate::probe::{PortProbe, TcpBindProbe};

/// Distance between consecutive candidate bases.
///
/// A collision at base `b` moves the search to `b + 10`, so base 8080 with
/// 8080 taken is retried at 8090.
pub const PORT_STEP: u16 = 10;

/// Highest base port tried before giving up.
pub const MAX_BASE_PORT: u16 = 65000;

/// Per-port availability of one candidate triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortAvailability {
    pub ports: PortSet,
    pub app_free: bool,
    pub data_free: bool,
    pub graph_free: bool,
}

impl PortAvailability {
    pub fn is_available(&self) -> bool {
        self.app_free && self.data_free && self.graph_free
    }
}

/// Finds free port triples on this host.
#[derive(Clone)]
pub struct PortAllocator {
    probe: Arc<dyn PortProbe>,
    default_base: u16,
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new(Arc::new(TcpBindProbe))
    }
}

impl PortAllocator {
    pub fn new(probe: Arc<dyn PortProbe>) -> Self {
        Self {
            probe,
            default_base: DEFAULT_BASE_PORT,
        }
    }

    /// Override the base used when the caller does not supply one.
    pub fn with_default_base(mut self, base: u16) -> Self {
        self.default_base = base;
        self
    }

    /// Find the first free triple at or above `base`.
    ///
    /// `None` and `Some(0)` both mean "use the default base".
    pub fn allocate(&self, base: Option<u16>) -> PortResult<PortSet> {
        self.allocate_avoiding(base, &[])
    }

    /// Like [`allocate`](Self::allocate), but a candidate sharing any port
    /// with a `reserved` triple counts as busy even when every port binds.
    ///
    /// Stopped instances hold no sockets, so their recorded ports are only
    /// visible through `reserved`.
    pub fn allocate_avoiding(
        &self,
        base: Option<u16>,
        reserved: &[PortSet],
    ) -> PortResult<PortSet> {
        let start = match base {
            Some(port) if port != 0 => port,
            _ => self.default_base,
        };

        let mut candidate = start;
        while candidate <= MAX_BASE_PORT {
            if let Some(availability) = self.inspect(candidate) {
                let claimed = reserved.iter().any(|r| r.overlaps(&availability.ports));
                if availability.is_available() && !claimed {
                    debug!(start, base = candidate, "port set allocated");
                    return Ok(availability.ports);
                }
                debug!(base = candidate, claimed, "port set busy, advancing");
            }
            candidate = match candidate.checked_add(PORT_STEP) {
                Some(next) => next,
                None => break,
            };
        }

        Err(PortError::Exhausted { start })
    }

    /// Check every port of the triple at `base`.
    ///
    /// Returns `None` when the triple does not fit in the port range.
    pub fn inspect(&self, base: u16) -> Option<PortAvailability> {
        let ports = PortSet::from_base(base)?;
        Some(PortAvailability {
            ports,
            app_free: self.probe.is_free(ports.app),
            data_free: self.probe.is_free(ports.data),
            graph_free: self.probe.is_free(ports.graph),
        })
    }
}
