//! Port abstraction for API token persistence.
use async_trait::async_trait;

use crate::domain::{AuthToken, AuthTokenRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by token repository adapters.
    pub enum AuthTokenPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
        /// The user already owns a token, or the key is taken.
        Conflict { message: String } => "token already exists: {message}",
    }
}

/// Driven port over the token table. Each user owns at most one token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Fetch the token owned by `user_id`, if one has been issued.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthTokenRecord>, AuthTokenPersistenceError>;

    /// Resolve a presented key to its record.
    async fn find_by_key(
        &self,
        key: &AuthToken,
    ) -> Result<Option<AuthTokenRecord>, AuthTokenPersistenceError>;

    /// Persist a freshly issued token.
    ///
    /// Fails with [`AuthTokenPersistenceError::Conflict`] when the owner
    /// already has a token.
    async fn insert(&self, record: &AuthTokenRecord) -> Result<(), AuthTokenPersistenceError>;
}
