//! Database readiness polling.
//!
//! Used by the `wait-for-db` command to block container start-up until the
//! database accepts queries.

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::ports::{DatabaseProbe, DatabaseProbeError};

/// Default pause between probe attempts.
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Pause between failed attempts.
    pub interval: Duration,
    /// Give up after this many failed attempts; `None` polls forever.
    pub max_attempts: Option<u32>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_WAIT_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Raised when the attempt budget runs out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("database still unavailable after {attempts} attempts: {last_error}")]
pub struct WaitTimeout {
    pub attempts: u32,
    pub last_error: DatabaseProbeError,
}

/// Poll `probe` until it succeeds or the policy's attempt limit is reached.
///
/// Returns the number of attempts made, including the successful one.
pub async fn wait_for_database<P>(probe: &P, policy: WaitPolicy) -> Result<u32, WaitTimeout>
where
    P: DatabaseProbe + ?Sized,
{
    info!("waiting for database");
    let mut attempts = 0_u32;
    loop {
        attempts = attempts.saturating_add(1);
        match probe.probe().await {
            Ok(()) => {
                info!(attempts, "database available");
                return Ok(attempts);
            }
            Err(error) => {
                if policy.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(WaitTimeout {
                        attempts,
                        last_error: error,
                    });
                }
                warn!(
                    attempts,
                    %error,
                    retry_in_ms = policy.interval.as_millis(),
                    "database unavailable, waiting"
                );
                tokio::time::sleep(policy.interval).await;
            }
        }
    }
}
