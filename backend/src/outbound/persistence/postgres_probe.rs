//! PostgreSQL implementation of the [`DatabaseProbe`] port.

use async_trait::async_trait;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{DatabaseProbe, DatabaseProbeError};

/// Opens a fresh connection per probe and runs `SELECT 1`. Does not use the
/// connection pool.
#[derive(Debug, Clone)]
pub struct PostgresProbe {
    database_url: String,
}

impl PostgresProbe {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }
}

#[async_trait]
impl DatabaseProbe for PostgresProbe {
    async fn probe(&self) -> Result<(), DatabaseProbeError> {
        let mut conn = AsyncPgConnection::establish(&self.database_url)
            .await
            .map_err(|err| DatabaseProbeError::unavailable(err.to_string()))?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| DatabaseProbeError::unavailable(err.to_string()))
    }
}
