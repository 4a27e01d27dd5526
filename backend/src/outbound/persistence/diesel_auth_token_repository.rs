//! PostgreSQL-backed `AuthTokenRepository` implementation using Diesel ORM.
//!
//! `auth_tokens.key` is the primary key and `auth_tokens.user_id` carries a
//! unique index, so a racing second insert for the same user fails with a
//! unique violation that maps to [`AuthTokenPersistenceError::Conflict`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuthTokenPersistenceError, AuthTokenRepository};
use crate::domain::{AuthToken, AuthTokenRecord, UserId};

use super::diesel_basic_error_mapping::{DieselFailure, classify_diesel_error, map_basic_pool_error};
use super::models::{AuthTokenRow, NewAuthTokenRow};
use super::pool::{DbPool, PoolError};
use super::schema::auth_tokens;

/// Diesel-backed implementation of the [`AuthTokenRepository`] port.
#[derive(Clone)]
pub struct DieselAuthTokenRepository {
    pool: DbPool,
}

impl DieselAuthTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthTokenPersistenceError {
    map_basic_pool_error(error, AuthTokenPersistenceError::connection)
}

fn map_diesel_error(error: &diesel::result::Error) -> AuthTokenPersistenceError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => AuthTokenPersistenceError::connection(message),
        DieselFailure::UniqueViolation { constraint } => AuthTokenPersistenceError::conflict(
            constraint.unwrap_or_else(|| "auth_tokens unique index".to_owned()),
        ),
        DieselFailure::Query(message) => AuthTokenPersistenceError::query(message),
    }
}

fn row_to_record(row: AuthTokenRow) -> Result<AuthTokenRecord, AuthTokenPersistenceError> {
    let key = AuthToken::parse(&row.key)
        .map_err(|err| AuthTokenPersistenceError::query(format!("stored key is invalid: {err}")))?;
    Ok(AuthTokenRecord {
        key,
        user_id: UserId::from_uuid(row.user_id),
        created_at: row.created_at,
    })
}

#[async_trait]
impl AuthTokenRepository for DieselAuthTokenRepository {
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AuthTokenRecord>, AuthTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = auth_tokens::table
            .filter(auth_tokens::user_id.eq(user_id.as_uuid()))
            .select(AuthTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;

        row.map(row_to_record).transpose()
    }

    async fn find_by_key(
        &self,
        key: &AuthToken,
    ) -> Result<Option<AuthTokenRecord>, AuthTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = auth_tokens::table
            .find(key.as_str())
            .select(AuthTokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err))?;

        row.map(row_to_record).transpose()
    }

    async fn insert(&self, record: &AuthTokenRecord) -> Result<(), AuthTokenPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewAuthTokenRow {
            key: record.key.as_str(),
            user_id: *record.user_id.as_uuid(),
            created_at: record.created_at,
        };

        diesel::insert_into(auth_tokens::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(&err))
    }
}
