//! One-way password storage.
//!
//! Passwords are stored as Argon2id PHC strings. Accounts created without a
//! password receive an unusable marker instead, which never verifies.

use std::fmt;

use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use tracing::warn;

/// Prefix marking a stored value that can never match a candidate.
const UNUSABLE_PREFIX: char = '!';
const UNUSABLE_SUFFIX_BYTES: usize = 20;

/// Failure raised while deriving a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashingError {
    /// The configured cost parameters were rejected by Argon2.
    #[error("invalid password hash parameters: {message}")]
    InvalidParameters {
        /// Reason reported by the hashing library.
        message: String,
    },
    /// Hash derivation failed.
    #[error("failed to hash password: {message}")]
    Hash {
        /// Reason reported by the hashing library.
        message: String,
    },
}

/// Stored password representation.
///
/// The inner value is either a PHC string or an unusable marker. It is never
/// exposed through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Rehydrate a stored value.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Marker for accounts created without a password.
    pub fn unusable() -> Self {
        let suffix: [u8; UNUSABLE_SUFFIX_BYTES] = rand::random();
        Self(format!("{UNUSABLE_PREFIX}{}", hex::encode(suffix)))
    }

    /// Whether a candidate password could ever match this value.
    pub fn is_usable(&self) -> bool {
        !self.0.starts_with(UNUSABLE_PREFIX)
    }

    /// Check `candidate` against the stored hash.
    ///
    /// Cost parameters are read from the PHC string, so hashes created under
    /// older settings keep verifying.
    pub fn verify(&self, candidate: &str) -> bool {
        if !self.is_usable() {
            return false;
        }
        let parsed = match PhcString::new(&self.0) {
            Ok(parsed) => parsed,
            Err(error) => {
                warn!(%error, "stored password hash is not a valid PHC string");
                return false;
            }
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }

    /// Raw stored form for persistence adapters.
    pub fn as_stored(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Derives Argon2id hashes with fixed cost parameters.
///
/// # Examples
/// ```
/// use accounts::domain::{HashCost, PasswordHasher};
///
/// let hasher = PasswordHasher::new(HashCost { memory_kib: 8, iterations: 1, parallelism: 1 })
///     .expect("valid parameters");
/// let hash = hasher.hash("core24299").expect("hash password");
/// assert!(hash.verify("core24299"));
/// assert!(!hash.verify("wrong"));
/// ```
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Build a hasher, validating the cost parameters up front.
    pub fn new(cost: HashCost) -> Result<Self, PasswordHashingError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| PasswordHashingError::InvalidParameters {
                message: err.to_string(),
            })?;
        Ok(Self { params })
    }

    /// Hash `plain` with a fresh random salt.
    pub fn hash(&self, plain: &str) -> Result<PasswordHash, PasswordHashingError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| PasswordHash(hash.to_string()))
            .map_err(|err| PasswordHashingError::Hash {
                message: err.to_string(),
            })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}
