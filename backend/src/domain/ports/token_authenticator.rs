//! Driving port for resolving a presented API token to its owner.

use async_trait::async_trait;

use crate::domain::{Error, User};

/// Domain use-case port for request authentication.
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Resolve `key` to an active user.
    ///
    /// Unknown keys and inactive owners fail with an `unauthorized` error.
    async fn authenticate(&self, key: &str) -> Result<User, Error>;
}
