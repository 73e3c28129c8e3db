pub mod info;
pub mod instance;

use anyhow::Context;
use graphsense_core::InstanceName;

/// Instance names on the command line go through the same sanitizing as deploy.
fn instance_name(raw: &str) -> anyhow::Result<InstanceName> {
    InstanceName::parse(raw).with_context(|| format!("invalid instance name '{raw}'"))
}
