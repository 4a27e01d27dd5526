//! In-process adapters for the account repositories.
//!
//! Used when no database URL is configured and by HTTP-level tests. State
//! lives behind a `tokio::sync::RwLock`, so uniqueness checks and inserts
//! happen under one write guard.

mod auth_token_repository;
mod user_repository;

pub use auth_token_repository::InMemoryAuthTokenRepository;
pub use user_repository::InMemoryUserRepository;
