//! Domain primitives, services and ports.
//!
//! Purpose: Define strongly typed account entities and the use-cases that
//! operate on them. Adapters depend on this module; it depends on no adapter.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User (alias to `user::User`): email-keyed account with privileges.
//! - AccountService (alias to `accounts::AccountService`): every account
//!   use-case, implemented over the driven repository ports.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod password;
pub mod ports;
pub mod readiness;
pub mod trace_id;
pub mod user;

pub use self::accounts::{AccountService, DEFAULT_MIN_PASSWORD_LENGTH, PasswordPolicy};
pub use self::auth::{
    AuthToken, AuthTokenFormatError, AuthTokenRecord, LoginCredentials, LoginValidationError,
    TOKEN_KEY_LEN,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password::{HashCost, PasswordHash, PasswordHasher, PasswordHashingError};
pub use self::readiness::{DEFAULT_WAIT_INTERVAL, WaitPolicy, WaitTimeout, wait_for_database};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DisplayName, EMAIL_MAX, EmailAddress, NAME_MAX, NewUserFields, Privileges, User, UserId,
    UserParts, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use accounts::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
