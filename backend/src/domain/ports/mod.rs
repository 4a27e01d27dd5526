//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_token_repository;
mod database_probe;
mod login_service;
mod registration_service;
mod token_authenticator;
mod user_profile_service;
mod user_repository;

#[cfg(test)]
pub use auth_token_repository::MockAuthTokenRepository;
pub use auth_token_repository::{AuthTokenPersistenceError, AuthTokenRepository};
#[cfg(test)]
pub use database_probe::MockDatabaseProbe;
pub use database_probe::{DatabaseProbe, DatabaseProbeError};
pub use login_service::LoginService;
pub use registration_service::{Registration, RegistrationService};
pub use token_authenticator::TokenAuthenticator;
pub use user_profile_service::{ProfileUpdate, UserProfileService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
