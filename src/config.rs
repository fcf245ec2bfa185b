//! Configuration for a provisioning run.
//!
//! Everything the orchestrator needs is passed in explicitly so multiple
//! environments or tests can run side by side without colliding on names.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for provisioning one database container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Image repository (e.g. "postgres").
    pub image: String,
    /// Image tag (e.g. "16-alpine").
    pub tag: String,
    /// Logical container name used to detect and reuse a prior instance.
    pub container_name: String,
    /// Database port, published 1:1 on the host.
    pub port: u16,
    /// Environment variables as ordered KEY=VALUE strings.
    pub env: Vec<String>,
    /// Readiness budget when reusing an already-running container.
    pub warm_timeout: Duration,
    /// Readiness budget for a cold start (created or restarted container).
    pub cold_timeout: Duration,
    /// Interval between readiness probe attempts.
    pub poll_interval: Duration,
}

impl ProvisionConfig {
    /// Creates a configuration with default timeouts (warm 10s, cold 120s,
    /// 1s poll interval).
    pub fn new(
        image: impl Into<String>,
        tag: impl Into<String>,
        container_name: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            image: image.into(),
            tag: tag.into(),
            container_name: container_name.into(),
            port,
            env: Vec::new(),
            warm_timeout: Duration::from_secs(10),
            cold_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Adds an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push(format!("{}={}", key.into(), value.into()));
        self
    }

    /// Sets both readiness timeouts.
    pub fn with_timeouts(mut self, warm: Duration, cold: Duration) -> Self {
        self.warm_timeout = warm;
        self.cold_timeout = cold;
        self
    }

    /// Sets the readiness poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Full image reference including the tag.
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}
