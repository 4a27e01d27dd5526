//! Driving port for self-service account creation.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Error, User};

/// Raw registration payload.
///
/// Fields stay unvalidated so the service can report every problem with a
/// field-level error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub name: Option<String>,
}

/// Domain use-case port for registering a user.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Validate the payload, create the user and return it.
    async fn register(&self, registration: Registration) -> Result<User, Error>;
}
