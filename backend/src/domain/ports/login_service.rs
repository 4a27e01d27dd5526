//! Driving port for exchanging credentials for an API token.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing (or importing) the backing
//! infrastructure.

use async_trait::async_trait;

use crate::domain::{AuthToken, Error, LoginCredentials};

/// Domain use-case port for token issuance.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the caller's token, creating it on
    /// first use.
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error>;
}
