//! Port for checking that the backing database accepts queries.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failure reported by a readiness probe.
    pub enum DatabaseProbeError {
        /// The database could not be reached or refused the probe query.
        Unavailable { message: String } => "database unavailable: {message}",
    }
}

/// Driven port used by the readiness poller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Open a connection and run a trivial query.
    async fn probe(&self) -> Result<(), DatabaseProbeError>;
}
