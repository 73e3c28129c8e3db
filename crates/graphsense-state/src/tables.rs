//! redb table definitions for the instance registry.

use redb::TableDefinition;

/// Container records keyed by `{instance_name}:{container_name}`.
pub const INSTANCES: TableDefinition<&str, &[u8]> = TableDefinition::new("instances");
