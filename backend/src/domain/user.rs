//! User data model.
//!
//! Users are keyed by email address; there is no separate username. Email
//! addresses are normalised on construction so lookups and the uniqueness
//! constraint agree on a single canonical form.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PasswordHash;

/// Maximum stored length of an email address.
pub const EMAIL_MAX: usize = 255;
/// Maximum stored length of a display name.
pub const NAME_MAX: usize = 255;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    NameTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "Users must have an email address"),
            Self::InvalidEmail => write!(f, "Enter a valid email address."),
            Self::EmailTooLong { max } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
            Self::NameTooLong { max } => {
                write!(f, "Ensure this field has no more than {max} characters.")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only: one `@` with non-blank text on either side.
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address.
///
/// ## Invariants
/// - Surrounding whitespace is removed.
/// - The domain portion (after the last `@`) is lower-cased; the local part
///   keeps its original case.
/// - At most [`EMAIL_MAX`] characters after normalisation.
///
/// Lower-casing stops at the domain on purpose: addresses that differ only
/// in local-part case (`Ada@example.com` and `ada@example.com`) are distinct
/// values and therefore distinct accounts.
///
/// # Examples
/// ```
/// use accounts::domain::EmailAddress;
///
/// let email = EmailAddress::new(" Ada@EXAMPLE.com ").expect("valid email");
/// assert_eq!(email.as_ref(), "Ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }

        let normalised = match trimmed.rsplit_once('@') {
            Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
            None => return Err(UserValidationError::InvalidEmail),
        };
        // Lower-casing can lengthen text (`İ` becomes two chars).
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional human readable name; empty by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Optional values accepted by the user factories beyond email and password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserFields {
    pub name: DisplayName,
    pub is_active: bool,
}

impl Default for NewUserFields {
    fn default() -> Self {
        Self {
            name: DisplayName::default(),
            is_active: true,
        }
    }
}

/// Privilege flags granted at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privileges {
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Privileges {
    /// Flags for an ordinary account.
    pub const fn regular() -> Self {
        Self {
            is_staff: false,
            is_superuser: false,
        }
    }

    /// Flags for an administrative account.
    pub const fn superuser() -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
        }
    }
}

/// Raw components used to assemble a [`User`].
#[derive(Debug, Clone)]
pub struct UserParts {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: DisplayName,
    pub password: PasswordHash,
    pub is_active: bool,
    pub privileges: Privileges,
    pub date_joined: DateTime<Utc>,
}

/// Application user.
///
/// ## Invariants
/// - `email` is normalised and unique across users.
/// - `password` is only ever held as a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: DisplayName,
    password: PasswordHash,
    is_active: bool,
    privileges: Privileges,
    date_joined: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn from_parts(parts: UserParts) -> Self {
        let UserParts {
            id,
            email,
            name,
            password,
            is_active,
            privileges,
            date_joined,
        } = parts;
        Self {
            id,
            email,
            name,
            password,
            is_active,
            privileges,
            date_joined,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Stored password hash, for persistence adapters only.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_staff(&self) -> bool {
        self.privileges.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.privileges.is_superuser
    }

    pub fn privileges(&self) -> Privileges {
        self.privileges
    }

    pub fn date_joined(&self) -> DateTime<Utc> {
        self.date_joined
    }

    /// Whether `candidate` matches the stored password.
    pub fn check_password(&self, candidate: &str) -> bool {
        self.password.verify(candidate)
    }

    /// Replace the display name.
    pub fn rename(&mut self, name: DisplayName) {
        self.name = name;
    }

    /// Replace the stored password hash.
    pub fn replace_password(&mut self, password: PasswordHash) {
        self.password = password;
    }
}

#[cfg(test)]
mod tests;
