//! graphsense-state: durable record of deployed instances.
//!
//! Backed by [redb](https://docs.rs/redb). One row per container of an
//! instance, JSON-serialized into a `&[u8]` value column under the composite
//! key `{instance_name}:{container_name}`. Instance names never contain `:`,
//! so a `{instance_name}:` prefix scan selects exactly one instance.
//!
//! The store only remembers what was deployed. Whether containers are
//! actually running is answered by the compose engine, not by this crate.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::InstanceRecord;
