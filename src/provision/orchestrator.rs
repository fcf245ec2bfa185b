//! Top-level orchestration of the container lifecycle.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::conflict::{start_gracefully, RemovedContainer};
use super::readiness::wait_until_ready;
use super::{builder, locator};
use crate::config::ProvisionConfig;
use crate::engine::ContainerEngine;
use crate::error::ProvisionError;
use crate::probe::ReadinessProbe;

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionReport {
    /// Engine id of the ready container.
    pub container_id: String,
    /// Its logical name.
    pub container_name: String,
    /// Whether an existing container was reused instead of created.
    pub reused: bool,
    /// Containers removed to free the published port.
    pub removed: Vec<RemovedContainer>,
    /// Readiness probe attempts until the first success.
    pub probe_attempts: u32,
}

/// Sequences image provisioning, locate-or-create, graceful start, and the
/// readiness wait. Each step depends on the previous one; there is no
/// parallelism and no rollback. A failed run may leave a created or stopped
/// container behind for the next run's locator to reuse.
pub struct Orchestrator {
    engine: Arc<dyn ContainerEngine>,
    probe: Arc<dyn ReadinessProbe>,
    config: ProvisionConfig,
}

impl Orchestrator {
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        probe: Arc<dyn ReadinessProbe>,
        config: ProvisionConfig,
    ) -> Self {
        Self {
            engine,
            probe,
            config,
        }
    }

    /// Ensures the configured database container is running and answering
    /// queries. Idempotent: when the container is already running and ready,
    /// only the lookup and the readiness check are performed.
    pub async fn ensure_database_container_running(
        &self,
    ) -> Result<ProvisionReport, ProvisionError> {
        let config = &self.config;

        self.engine
            .ensure_image(&config.image, &config.tag)
            .await
            .map_err(|e| ProvisionError::ImagePull {
                image: config.image_ref(),
                reason: e.to_string(),
            })?;

        let existing = locator::find_by_name(self.engine.as_ref(), &config.container_name).await?;

        let (handle, reused, removed, timeout) = match existing {
            Some(handle) if handle.state.is_running() => {
                info!(
                    container = %handle.name,
                    id = %handle.id,
                    "Reusing running container"
                );
                // Already warm: a short readiness budget is enough.
                (handle, true, Vec::new(), config.warm_timeout)
            }
            Some(handle) => {
                info!(
                    container = %handle.name,
                    id = %handle.id,
                    state = ?handle.state,
                    "Restarting existing container"
                );
                let removed =
                    start_gracefully(self.engine.as_ref(), &handle, config.port).await?;
                (handle, true, removed, config.cold_timeout)
            }
            None => {
                let handle = builder::create(self.engine.as_ref(), config).await?;
                let removed =
                    start_gracefully(self.engine.as_ref(), &handle, config.port).await?;
                (handle, false, removed, config.cold_timeout)
            }
        };

        let probe_attempts =
            self.await_readiness(&handle.name, config.poll_interval, timeout).await?;

        Ok(ProvisionReport {
            container_id: handle.id,
            container_name: handle.name,
            reused,
            removed,
            probe_attempts,
        })
    }

    async fn await_readiness(
        &self,
        name: &str,
        interval: Duration,
        timeout: Duration,
    ) -> Result<u32, ProvisionError> {
        info!(container = %name, timeout = ?timeout, "Waiting for database readiness");
        let attempts = wait_until_ready(self.probe.as_ref(), interval, timeout).await?;
        info!(container = %name, attempts, "Database ready");
        Ok(attempts)
    }
}
