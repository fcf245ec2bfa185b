//! Readiness gate: retry-until-deadline with transient-error absorption.
//!
//! The database's internal startup signal is not observable from outside the
//! container, so readiness is a bounded spin-poll: one probe attempt per
//! interval until the first successful round-trip or the deadline. Transient
//! probe errors are expected warm-up noise and never surface; fatal ones
//! (as classified by the probe) abort the wait immediately.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::ProvisionError;
use crate::probe::{ProbeError, ReadinessProbe};

/// Polls `probe` every `interval` until it succeeds or `timeout` elapses.
/// Returns the number of attempts used. The first attempt runs immediately;
/// the deadline is computed once, so at most `timeout / interval + 1`
/// attempts are made.
pub async fn wait_until_ready(
    probe: &dyn ReadinessProbe,
    interval: Duration,
    timeout: Duration,
) -> Result<u32, ProvisionError> {
    let deadline = Instant::now() + timeout;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;

        match probe.probe().await {
            Ok(()) => {
                debug!(attempts, "Database ready");
                return Ok(attempts);
            }
            Err(ProbeError::Fatal(reason)) => {
                return Err(ProvisionError::Probe { reason });
            }
            Err(ProbeError::NotReady(reason)) => {
                debug!(attempts, reason = %reason, "Database not ready yet");
            }
        }

        if Instant::now() >= deadline {
            return Err(ProvisionError::ReadinessTimeout { timeout, attempts });
        }

        tokio::time::sleep(interval).await;
    }
}
