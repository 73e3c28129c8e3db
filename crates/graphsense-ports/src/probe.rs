//! Port availability checks.

use std::net::{Ipv4Addr, TcpListener};

use tracing::trace;

/// Answers "can this host port be bound right now?".
pub trait PortProbe: Send + Sync {
    fn is_free(&self, port: u16) -> bool;
}

/// Binds a throwaway listener on all interfaces; a bind failure means "in use".
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpBindProbe;

impl PortProbe for TcpBindProbe {
    fn is_free(&self, port: u16) -> bool {
        // The listener is dropped immediately, releasing the port.
        let free = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).is_ok();
        trace!(port, free, "port probed");
        free
    }
}
