//! Construction and creation of the database container.

use tracing::info;

use crate::config::ProvisionConfig;
use crate::engine::{ContainerEngine, ContainerHandle, ContainerSpec};
use crate::error::ProvisionError;

/// Builds the container specification from the run configuration. The host
/// binding is fixed 1:1 with the container port; no dynamic allocation.
pub fn build_spec(config: &ProvisionConfig) -> ContainerSpec {
    ContainerSpec {
        image: config.image_ref(),
        name: config.container_name.clone(),
        env: config.env.clone(),
        port: config.port,
    }
}

/// Creates a new container from the configuration. The caller is expected to
/// have ruled out an existing holder of the name via the locator; a rejection
/// here (e.g. a naming race) is fatal and not retried.
pub async fn create(
    engine: &dyn ContainerEngine,
    config: &ProvisionConfig,
) -> Result<ContainerHandle, ProvisionError> {
    let spec = build_spec(config);

    let handle = engine
        .create_container(&spec)
        .await
        .map_err(|e| ProvisionError::Create {
            name: spec.name.clone(),
            reason: e.to_string(),
        })?;

    info!(
        container = %handle.name,
        id = %handle.id,
        image = %spec.image,
        port = spec.port,
        "Container created"
    );

    Ok(handle)
}
