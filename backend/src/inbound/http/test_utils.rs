//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::{AccountService, HashCost, PasswordHasher, PasswordPolicy};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemoryAuthTokenRepository, InMemoryUserRepository};

/// Account service over in-memory repositories.
pub type TestAccounts = AccountService<InMemoryUserRepository, InMemoryAuthTokenRepository>;

/// Argon2 parameters cheap enough for unit tests.
pub fn fast_hasher() -> PasswordHasher {
    let cost = HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    PasswordHasher::new(cost).expect("minimal Argon2 parameters are valid")
}

/// Build HTTP state backed by fresh in-memory repositories.
///
/// The service handle is returned too so tests can seed users directly.
pub fn in_memory_state() -> (web::Data<HttpState>, Arc<TestAccounts>) {
    let service = Arc::new(AccountService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryAuthTokenRepository::default()),
        fast_hasher(),
        PasswordPolicy::default(),
    ));
    let state = web::Data::new(HttpState::from_service(service.clone()));
    (state, service)
}
