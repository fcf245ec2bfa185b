//! Error types for dbforge operations.
//!
//! Two layers:
//! - [`EngineError`] — classified failures from the container engine boundary.
//! - [`ProvisionError`] — failures of the provisioning run itself, carrying
//!   enough context (image, name, port, timeout) to diagnose without reading
//!   engine logs.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by the container engine, classified from the raw API
/// response so callers can react to the specific failure kind.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested host port is already bound by another container.
    #[error("host port already allocated: {0}")]
    PortInUse(String),

    /// A container with the requested name already exists.
    #[error("container name already in use: {0}")]
    NameInUse(String),

    /// The referenced container is gone.
    #[error("no such container: {0}")]
    NotFound(String),

    /// Any other engine API failure.
    #[error("engine API error: {0}")]
    Api(String),
}

/// Errors that can occur during a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The host OS has no known container engine endpoint convention.
    #[error("unsupported platform '{os}': no known container engine endpoint")]
    UnsupportedPlatform { os: String },

    /// Pulling or verifying the image failed. Not retried at this layer.
    #[error("failed to ensure image '{image}': {reason}")]
    ImagePull { image: String, reason: String },

    /// The engine rejected the container specification.
    #[error("failed to create container '{name}': {reason}")]
    Create { name: String, reason: String },

    /// Starting the container failed even after conflict resolution.
    #[error("failed to start container '{name}' on port {port}: {reason}")]
    Start {
        name: String,
        port: u16,
        reason: String,
    },

    /// The database never answered the liveness query within the deadline.
    #[error("database not ready after {attempts} attempts within {timeout:?}")]
    ReadinessTimeout { timeout: Duration, attempts: u32 },

    /// The readiness probe reported a non-transient failure (e.g. the
    /// credentials were rejected), so waiting longer cannot help.
    #[error("readiness probe failed fatally: {reason}")]
    Probe { reason: String },

    /// An engine operation outside the classified cases above failed.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
