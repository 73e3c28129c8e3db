//! graphsense-health: bounded readiness polling after `up`.
//!
//! An instance counts as ready once compose `ps` reports a running container.
//! Polling is bounded by a [`ReadinessPolicy`]; running out of attempts is an
//! outcome for the caller to report, never an error.

pub mod checker;

pub use checker::{ProbeResult, ReadinessOutcome, ReadinessPolicy, probe, wait_until_up};
