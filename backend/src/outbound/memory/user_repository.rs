//! In-memory `UserRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User, UserId};

#[derive(Default)]
struct UserTable {
    rows: HashMap<UserId, User>,
    email_index: HashMap<EmailAddress, UserId>,
}

/// User table held in process memory.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut table = self.table.write().await;
        if table.email_index.contains_key(user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        if table.rows.contains_key(user.id()) {
            return Err(UserPersistenceError::query(format!(
                "user id {} already exists",
                user.id()
            )));
        }
        table.email_index.insert(user.email().clone(), *user.id());
        table.rows.insert(*user.id(), user.clone());
        debug!(user_id = %user.id(), "stored user in memory");
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut table = self.table.write().await;
        let Some(existing) = table.rows.get_mut(user.id()) else {
            return Err(UserPersistenceError::query(format!(
                "user {} does not exist",
                user.id()
            )));
        };
        if existing.email() != user.email() {
            return Err(UserPersistenceError::query("email addresses are immutable"));
        }
        *existing = user.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.table.read().await.rows.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let table = self.table.read().await;
        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.rows.get(id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, PasswordHash, Privileges, UserParts};
    use chrono::Utc;
    use rstest::{fixture, rstest};

    fn user(email: &str) -> User {
        User::from_parts(UserParts {
            id: UserId::random(),
            email: EmailAddress::new(email).expect("valid email"),
            name: DisplayName::default(),
            password: PasswordHash::unusable(),
            is_active: true,
            privileges: Privileges::regular(),
            date_joined: Utc::now(),
        })
    }

    #[fixture]
    fn repo() -> InMemoryUserRepository {
        InMemoryUserRepository::default()
    }

    #[rstest]
    #[tokio::test]
    async fn insert_then_find(repo: InMemoryUserRepository) {
        let stored = user("ada@example.com");
        repo.insert(&stored).await.expect("insert");

        let by_id = repo.find_by_id(stored.id()).await.expect("lookup");
        let by_email = repo
            .find_by_email(&EmailAddress::new("ada@EXAMPLE.com").expect("valid email"))
            .await
            .expect("lookup");

        assert_eq!(by_id.as_ref(), Some(&stored));
        assert_eq!(by_email.as_ref(), Some(&stored));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected_without_writing(repo: InMemoryUserRepository) {
        repo.insert(&user("ada@example.com")).await.expect("first insert");

        let err = repo
            .insert(&user("ada@EXAMPLE.COM"))
            .await
            .expect_err("duplicate must fail");

        assert_eq!(err, UserPersistenceError::duplicate_email("ada@example.com"));
        assert_eq!(repo.len().await, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_replaces_mutable_fields(repo: InMemoryUserRepository) {
        let mut stored = user("ada@example.com");
        repo.insert(&stored).await.expect("insert");

        stored.rename(DisplayName::new("Ada").expect("valid name"));
        repo.update(&stored).await.expect("update");

        let fetched = repo
            .find_by_id(stored.id())
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(fetched.name().as_ref(), "Ada");
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_unknown_user_fails(repo: InMemoryUserRepository) {
        let err = repo
            .update(&user("ghost@example.com"))
            .await
            .expect_err("unknown user");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
