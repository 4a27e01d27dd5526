//! Authentication primitives such as login credentials and API tokens.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::UserId;

/// Number of random bytes behind each token key.
const TOKEN_BYTES: usize = 20;
/// Length of the hex-encoded token key.
pub const TOKEN_KEY_LEN: usize = TOKEN_BYTES * 2;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming. Normalisation
///   happens at lookup time.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use accounts::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "password").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string as supplied by the caller, trimmed.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Error returned when a presented token key is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("token must be {TOKEN_KEY_LEN} hexadecimal characters")]
pub struct AuthTokenFormatError;

/// Opaque API token key.
///
/// The key is never written to `Debug` output.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AuthToken(String);

impl AuthToken {
    /// Draw a fresh random key.
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        Self(hex::encode(bytes))
    }

    /// Parse a key presented by a client or read from storage.
    pub fn parse(raw: &str) -> Result<Self, AuthTokenFormatError> {
        if raw.len() != TOKEN_KEY_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AuthTokenFormatError);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Stored association between a token key and its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokenRecord {
    pub key: AuthToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl AuthTokenRecord {
    /// Mint a new record for `user_id`.
    pub fn issue(user_id: UserId) -> Self {
        Self {
            key: AuthToken::generate(),
            user_id,
            created_at: Utc::now(),
        }
    }
}
