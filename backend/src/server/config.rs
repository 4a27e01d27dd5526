//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use accounts::domain::{PasswordHasher, PasswordPolicy};
use accounts::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) hasher: PasswordHasher,
    pub(crate) policy: PasswordPolicy,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration that keeps accounts in memory until a pool
    /// is attached.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, hasher: PasswordHasher, policy: PasswordPolicy) -> Self {
        Self {
            bind_addr,
            hasher,
            policy,
            db_pool: None,
        }
    }

    /// Attach a database connection pool so the Diesel repositories are used.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
