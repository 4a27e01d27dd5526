//! Service configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `ACCOUNTS_*` environment variables over
//! defaults. Every field is optional; accessors apply the defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{DEFAULT_WAIT_INTERVAL, HashCost, PasswordPolicy, WaitPolicy};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
}

/// Configuration for the server and the operational commands.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct AccountsSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps accounts in memory.
    pub database_url: Option<String>,
    /// Minimum length of client-supplied passwords.
    pub min_password_length: Option<usize>,
    /// Argon2 memory cost in KiB.
    pub password_hash_memory_kib: Option<u32>,
    /// Argon2 pass count.
    pub password_hash_iterations: Option<u32>,
    /// Argon2 lanes.
    pub password_hash_parallelism: Option<u32>,
    /// Upper bound on pooled database connections.
    pub db_pool_max_size: Option<u32>,
    /// Pause between `wait-for-db` probes, in milliseconds.
    pub db_wait_interval_ms: Option<u64>,
    /// Give up waiting for the database after this many probes.
    pub db_wait_max_attempts: Option<u32>,
}

impl AccountsSettings {
    /// Return the bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the configured value is not a
    /// socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Return the database URL, treating a blank value as unset.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        let defaults = PasswordPolicy::default();
        PasswordPolicy {
            min_length: self.min_password_length.unwrap_or(defaults.min_length),
        }
    }

    /// Argon2 cost, each unset parameter taking the library default.
    pub fn hash_cost(&self) -> HashCost {
        let defaults = HashCost::default();
        HashCost {
            memory_kib: self.password_hash_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.password_hash_iterations.unwrap_or(defaults.iterations),
            parallelism: self
                .password_hash_parallelism
                .unwrap_or(defaults.parallelism),
        }
    }

    /// Pool configuration for `database_url`.
    pub fn pool_config(&self, database_url: &str) -> PoolConfig {
        let config = PoolConfig::new(database_url);
        match self.db_pool_max_size {
            Some(max_size) => config.with_max_size(max_size),
            None => config,
        }
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            interval: self
                .db_wait_interval_ms
                .map_or(DEFAULT_WAIT_INTERVAL, Duration::from_millis),
            max_attempts: self.db_wait_max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "ACCOUNTS_BIND_ADDR",
        "ACCOUNTS_DATABASE_URL",
        "ACCOUNTS_MIN_PASSWORD_LENGTH",
        "ACCOUNTS_PASSWORD_HASH_MEMORY_KIB",
        "ACCOUNTS_PASSWORD_HASH_ITERATIONS",
        "ACCOUNTS_PASSWORD_HASH_PARALLELISM",
        "ACCOUNTS_DB_POOL_MAX_SIZE",
        "ACCOUNTS_DB_WAIT_INTERVAL_MS",
        "ACCOUNTS_DB_WAIT_MAX_ATTEMPTS",
    ];

    fn load_from_empty_args() -> AccountsSettings {
        AccountsSettings::load_from_iter([OsString::from("accounts")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.password_policy(), PasswordPolicy::default());
        assert_eq!(settings.hash_cost(), HashCost::default());
        assert_eq!(settings.wait_policy(), WaitPolicy::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ACCOUNTS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "ACCOUNTS_DATABASE_URL",
                Some("postgres://accounts@db/accounts".to_owned()),
            ),
            ("ACCOUNTS_MIN_PASSWORD_LENGTH", Some("8".to_owned())),
            ("ACCOUNTS_PASSWORD_HASH_MEMORY_KIB", None),
            ("ACCOUNTS_PASSWORD_HASH_ITERATIONS", Some("3".to_owned())),
            ("ACCOUNTS_PASSWORD_HASH_PARALLELISM", None),
            ("ACCOUNTS_DB_POOL_MAX_SIZE", Some("4".to_owned())),
            ("ACCOUNTS_DB_WAIT_INTERVAL_MS", Some("250".to_owned())),
            ("ACCOUNTS_DB_WAIT_MAX_ATTEMPTS", Some("7".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("configured address").port(),
            9000
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://accounts@db/accounts")
        );
        assert_eq!(settings.password_policy().min_length, 8);
        assert_eq!(settings.hash_cost().iterations, 3);
        assert_eq!(
            settings.hash_cost().memory_kib,
            HashCost::default().memory_kib
        );
        assert_eq!(
            settings
                .pool_config("postgres://accounts@db/accounts")
                .max_size(),
            4
        );
        assert_eq!(
            settings.wait_policy(),
            WaitPolicy {
                interval: Duration::from_millis(250),
                max_attempts: Some(7),
            }
        );
    }

    #[rstest]
    #[case(Some("  "))]
    #[case(Some(""))]
    #[case(None)]
    fn blank_database_url_means_in_memory(#[case] url: Option<&str>) {
        let settings = AccountsSettings {
            database_url: url.map(str::to_owned),
            ..AccountsSettings::default()
        };

        assert!(settings.database_url().is_none());
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = AccountsSettings {
            bind_addr: Some("localhost".to_owned()),
            ..AccountsSettings::default()
        };

        let err = settings.bind_addr().expect_err("not a socket address");

        assert!(matches!(err, SettingsError::BindAddr { .. }));
    }
}
