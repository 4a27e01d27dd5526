//! Account domain service.
//!
//! [`AccountService`] owns every use-case that touches the user and token
//! tables: the two user factories, self-service registration, token
//! issuance, token authentication and the caller's own profile. It talks to
//! storage only through the driven repository ports.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::domain::ports::{
    AuthTokenPersistenceError, AuthTokenRepository, LoginService, ProfileUpdate, Registration,
    RegistrationService, TokenAuthenticator, UserPersistenceError, UserProfileService,
    UserRepository,
};
use crate::domain::{
    AuthToken, AuthTokenRecord, DisplayName, EmailAddress, Error, LoginCredentials,
    NewUserFields, PasswordHash, PasswordHasher, Privileges, User, UserId, UserParts,
    UserValidationError,
};

/// Default minimum password length for registration and profile updates.
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 5;

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";
const INVALID_TOKEN: &str = "Invalid token.";
const INACTIVE_USER: &str = "User inactive or deleted.";
const DUMMY_PASSWORD: &str = "unknown-account-placeholder";

/// Password rules applied to client-supplied passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn required_error(field: &str) -> Error {
    field_error(field, "required", "This field is required.")
}

fn blank_error(field: &str) -> Error {
    field_error(field, "blank", "This field may not be blank.")
}

fn email_error(err: UserValidationError) -> Error {
    match err {
        UserValidationError::EmptyEmail => blank_error("email"),
        UserValidationError::EmailTooLong { .. } => {
            field_error("email", "max_length", err.to_string())
        }
        other => field_error("email", "invalid", other.to_string()),
    }
}

fn name_error(err: UserValidationError) -> Error {
    field_error("name", "max_length", err.to_string())
}

fn invalid_credentials() -> Error {
    field_error("non_field_errors", "authorization", INVALID_CREDENTIALS)
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => field_error(
            "email",
            "unique",
            "user with this email already exists.",
        ),
    }
}

fn map_token_error(error: AuthTokenPersistenceError) -> Error {
    match error {
        AuthTokenPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        AuthTokenPersistenceError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
        AuthTokenPersistenceError::Conflict { message } => {
            Error::internal(format!("unexpected token conflict: {message}"))
        }
    }
}

/// Account service implementing the driving ports.
#[derive(Clone)]
pub struct AccountService<U, T> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    /// Hash checked when a login names no account, derived lazily with `hasher`.
    dummy_hash: Arc<OnceCell<PasswordHash>>,
}

impl<U, T> AccountService<U, T> {
    /// Create a new service with the given repositories and password rules.
    pub fn new(
        users: Arc<U>,
        tokens: Arc<T>,
        hasher: PasswordHasher,
        policy: PasswordPolicy,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
            policy,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }
}

impl<U, T> AccountService<U, T>
where
    U: UserRepository,
    T: AuthTokenRepository,
{
    /// Create and persist an ordinary user.
    ///
    /// A missing password leaves the account with an unusable password. The
    /// password policy is not applied here; it guards client-facing paths.
    pub async fn create_user(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        fields: NewUserFields,
    ) -> Result<User, Error> {
        self.create_with_privileges(email, password, fields, Privileges::regular())
            .await
    }

    /// Create and persist a staff superuser.
    pub async fn create_superuser(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, Error> {
        self.create_with_privileges(
            email,
            password,
            NewUserFields::default(),
            Privileges::superuser(),
        )
        .await
    }

    async fn create_with_privileges(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        fields: NewUserFields,
        privileges: Privileges,
    ) -> Result<User, Error> {
        let email = match email {
            Some(raw) if !raw.trim().is_empty() => EmailAddress::new(raw).map_err(email_error)?,
            _ => {
                return Err(field_error(
                    "email",
                    "required",
                    "Users must have an email address.",
                ));
            }
        };
        let password = match password {
            Some(plain) => self.hash_password(plain).await?,
            None => PasswordHash::unusable(),
        };

        let user = User::from_parts(UserParts {
            id: UserId::random(),
            email,
            name: fields.name,
            password,
            is_active: fields.is_active,
            privileges,
            date_joined: chrono::Utc::now(),
        });
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(
            user_id = %user.id(),
            is_superuser = privileges.is_superuser,
            "user created"
        );
        Ok(user)
    }

    fn check_password_policy<'a>(&self, password: Option<&'a str>) -> Result<&'a str, Error> {
        let plain = password.ok_or_else(|| required_error("password"))?;
        if plain.is_empty() {
            return Err(blank_error("password"));
        }
        if plain.chars().count() < self.policy.min_length {
            return Err(field_error(
                "password",
                "min_length",
                format!(
                    "Ensure this field has at least {} characters.",
                    self.policy.min_length
                ),
            ));
        }
        Ok(plain)
    }

    /// Argon2 is CPU-bound, so derivation runs on the blocking pool.
    async fn hash_password(&self, plain: &str) -> Result<PasswordHash, Error> {
        let hasher = self.hasher.clone();
        let plain = Zeroizing::new(plain.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(plain.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(err.to_string()))
    }

    async fn verify_password(&self, user: &User, candidate: &str) -> Result<bool, Error> {
        let stored = user.password_hash().clone();
        let candidate = Zeroizing::new(candidate.to_owned());
        tokio::task::spawn_blocking(move || stored.verify(candidate.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))
    }

    /// Run one password check against a throwaway hash so a login for an
    /// unknown email takes as long as one with a wrong password.
    async fn check_dummy_password(&self, candidate: &str) -> Result<(), Error> {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
            .await?
            .clone();
        let candidate = Zeroizing::new(candidate.to_owned());
        tokio::task::spawn_blocking(move || dummy.verify(candidate.as_str()))
            .await
            .map(|_matched| ())
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))
    }

    async fn load_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found."))
    }

    async fn existing_token(&self, user_id: &UserId) -> Result<Option<AuthToken>, Error> {
        Ok(self
            .tokens
            .find_by_user(user_id)
            .await
            .map_err(map_token_error)?
            .map(|record| record.key))
    }
}

#[async_trait]
impl<U, T> RegistrationService for AccountService<U, T>
where
    U: UserRepository,
    T: AuthTokenRepository,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let Registration {
            email,
            password,
            name,
        } = registration;

        let email = email.ok_or_else(|| required_error("email"))?;
        let email = EmailAddress::new(&email).map_err(email_error)?;
        let password = self.check_password_policy(password.as_ref().map(|p| p.as_str()))?;
        let name = match name {
            Some(name) => DisplayName::new(name).map_err(name_error)?,
            None => DisplayName::default(),
        };

        self.create_user(
            Some(email.as_ref()),
            Some(password),
            NewUserFields {
                name,
                ..NewUserFields::default()
            },
        )
        .await
    }
}

#[async_trait]
impl<U, T> LoginService for AccountService<U, T>
where
    U: UserRepository,
    T: AuthTokenRepository,
{
    async fn issue_token(&self, credentials: &LoginCredentials) -> Result<AuthToken, Error> {
        let user = match EmailAddress::new(credentials.email()) {
            Ok(email) => self
                .users
                .find_by_email(&email)
                .await
                .map_err(map_user_error)?,
            Err(_) => None,
        };
        let Some(user) = user else {
            self.check_dummy_password(credentials.password()).await?;
            return Err(invalid_credentials());
        };
        if !self.verify_password(&user, credentials.password()).await? || !user.is_active() {
            return Err(invalid_credentials());
        }

        if let Some(token) = self.existing_token(user.id()).await? {
            return Ok(token);
        }

        let record = AuthTokenRecord::issue(*user.id());
        match self.tokens.insert(&record).await {
            Ok(()) => {
                debug!(user_id = %user.id(), "issued api token");
                Ok(record.key)
            }
            Err(AuthTokenPersistenceError::Conflict { message }) => {
                // A concurrent request won the insert; hand back its token.
                self.existing_token(user.id()).await?.ok_or_else(|| {
                    Error::internal(format!("token conflict without stored token: {message}"))
                })
            }
            Err(other) => Err(map_token_error(other)),
        }
    }
}

#[async_trait]
impl<U, T> TokenAuthenticator for AccountService<U, T>
where
    U: UserRepository,
    T: AuthTokenRepository,
{
    async fn authenticate(&self, key: &str) -> Result<User, Error> {
        let Ok(key) = AuthToken::parse(key) else {
            return Err(Error::unauthorized(INVALID_TOKEN));
        };
        let Some(record) = self
            .tokens
            .find_by_key(&key)
            .await
            .map_err(map_token_error)?
        else {
            return Err(Error::unauthorized(INVALID_TOKEN));
        };
        let Some(user) = self
            .users
            .find_by_id(&record.user_id)
            .await
            .map_err(map_user_error)?
        else {
            return Err(Error::unauthorized(INVALID_TOKEN));
        };
        if !user.is_active() {
            return Err(Error::unauthorized(INACTIVE_USER));
        }
        Ok(user)
    }
}

#[async_trait]
impl<U, T> UserProfileService for AccountService<U, T>
where
    U: UserRepository,
    T: AuthTokenRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load_user(user_id).await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let ProfileUpdate { name, password } = update;
        let name = name
            .map(DisplayName::new)
            .transpose()
            .map_err(name_error)?;
        let password = match password.as_ref() {
            Some(plain) => {
                let plain = self.check_password_policy(Some(plain.as_str()))?;
                Some(self.hash_password(plain).await?)
            }
            None => None,
        };

        let mut user = self.load_user(user_id).await?;
        if name.is_none() && password.is_none() {
            return Ok(user);
        }
        if let Some(name) = name {
            user.rename(name);
        }
        if let Some(hash) = password {
            user.replace_password(hash);
        }
        self.users.update(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "profile updated");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
