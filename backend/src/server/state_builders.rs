//! Builders wiring repository adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use accounts::domain::AccountService;
use accounts::domain::ports::{AuthTokenRepository, UserRepository};
use accounts::inbound::http::state::HttpState;
use accounts::outbound::memory::{InMemoryAuthTokenRepository, InMemoryUserRepository};
use accounts::outbound::persistence::{DieselAuthTokenRepository, DieselUserRepository};

use super::ServerConfig;

/// Which repository pair backs the account service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StorageBackend {
    Postgres,
    InMemory,
}

fn account_state<U, T>(users: U, tokens: T, config: &ServerConfig) -> web::Data<HttpState>
where
    U: UserRepository + 'static,
    T: AuthTokenRepository + 'static,
{
    let service = AccountService::new(
        Arc::new(users),
        Arc::new(tokens),
        config.hasher.clone(),
        config.policy,
    );
    web::Data::new(HttpState::from_service(Arc::new(service)))
}

/// Build the HTTP state, using Diesel repositories when a pool is configured
/// and in-memory ones otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> (web::Data<HttpState>, StorageBackend) {
    match &config.db_pool {
        Some(pool) => {
            info!("accounts are stored in PostgreSQL");
            let state = account_state(
                DieselUserRepository::new(pool.clone()),
                DieselAuthTokenRepository::new(pool.clone()),
                config,
            );
            (state, StorageBackend::Postgres)
        }
        None => {
            warn!("no database configured; accounts are kept in memory and lost on restart");
            let state = account_state(
                InMemoryUserRepository::default(),
                InMemoryAuthTokenRepository::default(),
                config,
            );
            (state, StorageBackend::InMemory)
        }
    }
}
