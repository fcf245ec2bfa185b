//! dbforge: provision a containerized database dependency.
//!
//! Ensures the image is present, starts or reuses a named container,
//! resolves port conflicts by evicting whatever holds the port, and blocks
//! until the database answers a trivial liveness query or a deadline passes.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod provision;

// Re-export commonly used types
pub use config::ProvisionConfig;
pub use error::{EngineError, ProvisionError};
pub use provision::{Orchestrator, ProvisionReport};
