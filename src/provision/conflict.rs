//! Graceful container start with port-conflict recovery.
//!
//! Starting a container can fail because another container already binds the
//! published host port. Recovery frees the port by removing every container
//! that publishes it, whatever its name, then retries the start exactly once.
//! Removal is destructive, so each removed container is reported back to the
//! caller and logged.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{ContainerEngine, ContainerHandle};
use crate::error::{EngineError, ProvisionError};

/// Audit record of a container removed to free the port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedContainer {
    pub id: String,
    pub name: String,
}

/// Starts `handle`, recovering once from a port conflict by stopping and
/// force-removing every container that publishes `port` on tcp. Returns the
/// removed containers. A second start failure propagates as a fatal
/// [`ProvisionError::Start`]; there are no further retries.
pub async fn start_gracefully(
    engine: &dyn ContainerEngine,
    handle: &ContainerHandle,
    port: u16,
) -> Result<Vec<RemovedContainer>, ProvisionError> {
    match engine.start_container(&handle.id).await {
        Ok(()) => {
            info!(container = %handle.name, id = %handle.id, "Container started");
            return Ok(Vec::new());
        }
        Err(EngineError::PortInUse(detail)) => {
            warn!(
                container = %handle.name,
                port,
                detail = %detail,
                "Start failed on port conflict, evicting holders"
            );
        }
        Err(e) => return Err(start_error(handle, port, e)),
    }

    let removed = free_port(engine, handle, port).await?;

    engine
        .start_container(&handle.id)
        .await
        .map_err(|e| start_error(handle, port, e))?;

    info!(
        container = %handle.name,
        id = %handle.id,
        evicted = removed.len(),
        "Container started after conflict resolution"
    );

    Ok(removed)
}

/// Stops and force-removes every container other than `handle` that publishes
/// `port` as a tcp host port.
async fn free_port(
    engine: &dyn ContainerEngine,
    handle: &ContainerHandle,
    port: u16,
) -> Result<Vec<RemovedContainer>, ProvisionError> {
    let mut removed = Vec::new();

    for container in engine.list_containers().await? {
        if container.id == handle.id || !container.publishes_host_port(port) {
            continue;
        }

        if container.state.is_running() {
            engine.stop_container(&container.id).await?;
        }
        engine.remove_container(&container.id).await?;

        warn!(
            container = %container.name,
            id = %container.id,
            port,
            "Removed container holding the port"
        );
        removed.push(RemovedContainer {
            id: container.id,
            name: container.name,
        });
    }

    Ok(removed)
}

fn start_error(handle: &ContainerHandle, port: u16, error: EngineError) -> ProvisionError {
    ProvisionError::Start {
        name: handle.name.clone(),
        port,
        reason: error.to_string(),
    }
}
