//! Shared helpers for the integration suites.

use std::sync::Arc;

use accounts::domain::{AccountService, HashCost, PasswordHasher, PasswordPolicy};
use accounts::outbound::memory::{InMemoryAuthTokenRepository, InMemoryUserRepository};

pub type MemoryAccounts = AccountService<InMemoryUserRepository, InMemoryAuthTokenRepository>;

/// Account service over fresh in-memory repositories with cheap Argon2
/// parameters. The user repository handle is returned for direct checks.
pub fn memory_accounts() -> (Arc<MemoryAccounts>, Arc<InMemoryUserRepository>) {
    let hasher = PasswordHasher::new(HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .expect("minimal Argon2 parameters are valid");
    let users = Arc::new(InMemoryUserRepository::default());
    let service = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(InMemoryAuthTokenRepository::default()),
        hasher,
        PasswordPolicy::default(),
    ));
    (service, users)
}
