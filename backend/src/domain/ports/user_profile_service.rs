//! Driving port for reading and updating the caller's own profile.

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::{Error, User, UserId};

/// Partial update of the mutable profile fields.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

/// Domain use-case port for the authenticated profile.
#[async_trait]
pub trait UserProfileService: Send + Sync {
    /// Return the profile for the authenticated user.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// Apply `update` to the authenticated user's record.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate)
    -> Result<User, Error>;
}
