//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, RegistrationService, TokenAuthenticator, UserProfileService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub profile: Arc<dyn UserProfileService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub authenticator: Arc<dyn TokenAuthenticator>,
    pub profile: Arc<dyn UserProfileService>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            registration,
            login,
            authenticator,
            profile,
        } = ports;
        Self {
            registration,
            login,
            authenticator,
            profile,
        }
    }

    /// Route every port to one service implementing all of them.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use accounts::domain::{AccountService, PasswordHasher, PasswordPolicy};
    /// use accounts::inbound::http::state::HttpState;
    /// use accounts::outbound::memory::{InMemoryAuthTokenRepository, InMemoryUserRepository};
    ///
    /// let service = AccountService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(InMemoryAuthTokenRepository::default()),
    ///     PasswordHasher::default(),
    ///     PasswordPolicy::default(),
    /// );
    /// let state = HttpState::from_service(Arc::new(service));
    /// let _login = state.login.clone();
    /// ```
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: RegistrationService + LoginService + TokenAuthenticator + UserProfileService + 'static,
    {
        Self::new(HttpStatePorts {
            registration: service.clone(),
            login: service.clone(),
            authenticator: service.clone(),
            profile: service,
        })
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
