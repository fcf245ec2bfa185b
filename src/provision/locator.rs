//! Lookup of an existing container by its logical name.

use crate::engine::{ContainerEngine, ContainerHandle};
use crate::error::ProvisionError;

/// Finds the container declared under `name`, in any state. Engine name
/// prefixes are already stripped at the boundary, so this is an exact match.
/// Read-only; returns `None` when no container holds the name.
pub async fn find_by_name(
    engine: &dyn ContainerEngine,
    name: &str,
) -> Result<Option<ContainerHandle>, ProvisionError> {
    let containers = engine.list_containers().await?;
    Ok(containers.into_iter().find(|c| c.name == name))
}
