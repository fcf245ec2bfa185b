//! Container provisioning: locate-or-create, graceful start, readiness gate.
//!
//! The orchestrator drives every step in order; nothing here calls back up.
//!
//! ```text
//! Start → EndpointResolved → ImageEnsured → {Reused | Created}
//!       → Started → Ready | Failed
//! ```

pub mod builder;
pub mod conflict;
pub mod locator;
pub mod orchestrator;
pub mod readiness;

pub use conflict::RemovedContainer;
pub use orchestrator::{Orchestrator, ProvisionReport};
