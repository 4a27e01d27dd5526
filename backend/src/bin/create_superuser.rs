//! Create a staff superuser in the configured database.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::ffi::OsString;
use std::sync::Arc;

use accounts::domain::{AccountService, PasswordHasher};
use accounts::outbound::persistence::{
    DbPool, DieselAuthTokenRepository, DieselUserRepository, run_pending_migrations,
};
use accounts::settings::AccountsSettings;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

const PASSWORD_ENV: &str = "ACCOUNTS_SUPERUSER_PASSWORD";

/// `create-superuser` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "create-superuser",
    about = "Create a staff superuser account",
    version
)]
struct CliArgs {
    /// Email address of the new superuser.
    #[arg(long, value_name = "email")]
    email: String,
    /// Password for the new account. Prefer `ACCOUNTS_SUPERUSER_PASSWORD`.
    #[arg(long, value_name = "password")]
    password: Option<String>,
    /// Database connection URL. Falls back to `ACCOUNTS_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = AccountsSettings::load_from_iter([OsString::from("create-superuser")])
        .map_err(|e| eyre!("failed to load settings: {e}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args, &settings))
}

async fn run(args: CliArgs, settings: &AccountsSettings) -> Result<()> {
    let CliArgs {
        email,
        password,
        database_url,
    } = args;
    let password = resolve_password(password, env::var(PASSWORD_ENV).ok())?;
    let database_url = database_url
        .or_else(|| settings.database_url().map(str::to_owned))
        .ok_or_else(|| eyre!("no database URL: pass --database-url or set ACCOUNTS_DATABASE_URL"))?;

    run_pending_migrations(&database_url).await?;
    let pool = DbPool::new(settings.pool_config(&database_url)).await?;
    let service = AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselAuthTokenRepository::new(pool)),
        PasswordHasher::new(settings.hash_cost())?,
        settings.password_policy(),
    );

    let user = service
        .create_superuser(Some(&email), Some(password.as_str()))
        .await
        .wrap_err("failed to create superuser")?;
    info!(user_id = %user.id(), email = %user.email(), "superuser created");
    Ok(())
}

/// Pick the password from the flag, then the environment.
fn resolve_password(
    flag: Option<String>,
    from_env: Option<String>,
) -> Result<Zeroizing<String>> {
    flag.or(from_env)
        .filter(|password| !password.is_empty())
        .map(Zeroizing::new)
        .ok_or_else(|| eyre!("no password: pass --password or set {PASSWORD_ENV}"))
}
