//! In-memory `AuthTokenRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{AuthTokenPersistenceError, AuthTokenRepository};
use crate::domain::{AuthToken, AuthTokenRecord, UserId};

#[derive(Default)]
struct TokenTable {
    by_key: HashMap<AuthToken, AuthTokenRecord>,
    by_user: HashMap<UserId, AuthToken>,
}

/// Token table held in process memory.
#[derive(Default)]
pub struct InMemoryAuthTokenRepository {
    table: RwLock<TokenTable>,
}

#[async_trait]
impl AuthTokenRepository for InMemoryAuthTokenRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthTokenRecord>, AuthTokenPersistenceError> {
        let table = self.table.read().await;
        Ok(table
            .by_user
            .get(user_id)
            .and_then(|key| table.by_key.get(key))
            .cloned())
    }

    async fn find_by_key(
        &self,
        key: &AuthToken,
    ) -> Result<Option<AuthTokenRecord>, AuthTokenPersistenceError> {
        Ok(self.table.read().await.by_key.get(key).cloned())
    }

    async fn insert(&self, record: &AuthTokenRecord) -> Result<(), AuthTokenPersistenceError> {
        let mut table = self.table.write().await;
        if table.by_user.contains_key(&record.user_id) {
            return Err(AuthTokenPersistenceError::conflict(format!(
                "user {} already has a token",
                record.user_id
            )));
        }
        if table.by_key.contains_key(&record.key) {
            return Err(AuthTokenPersistenceError::conflict("token key collision"));
        }
        table.by_user.insert(record.user_id, record.key.clone());
        table.by_key.insert(record.key.clone(), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn one_token_per_user() {
        let repo = InMemoryAuthTokenRepository::default();
        let user_id = UserId::random();
        let first = AuthTokenRecord::issue(user_id);
        repo.insert(&first).await.expect("first insert");

        let err = repo
            .insert(&AuthTokenRecord::issue(user_id))
            .await
            .expect_err("second token must conflict");
        assert!(matches!(err, AuthTokenPersistenceError::Conflict { .. }));

        let stored = repo.find_by_user(&user_id).await.expect("lookup");
        assert_eq!(stored, Some(first.clone()));
        let by_key = repo.find_by_key(&first.key).await.expect("lookup");
        assert_eq!(by_key, Some(first));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_key_is_absent() {
        let repo = InMemoryAuthTokenRepository::default();
        let found = repo
            .find_by_key(&AuthToken::generate())
            .await
            .expect("lookup");
        assert!(found.is_none());
    }
}
