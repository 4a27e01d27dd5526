//! Block until the configured PostgreSQL database accepts queries.
//!
//! Intended as a container start-up gate: exits 0 once `SELECT 1` succeeds
//! and non-zero once the optional attempt limit is exhausted.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::time::Duration;

use accounts::domain::{WaitPolicy, wait_for_database};
use accounts::outbound::persistence::PostgresProbe;
use accounts::settings::AccountsSettings;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `wait-for-db` command arguments. Unset flags fall back to `ACCOUNTS_*`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wait-for-db",
    about = "Wait until the accounts database accepts connections",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `ACCOUNTS_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Milliseconds to sleep between attempts.
    #[arg(long = "interval-ms", value_name = "ms")]
    interval_ms: Option<u64>,
    /// Give up after this many failed attempts.
    #[arg(long = "max-attempts", value_name = "n")]
    max_attempts: Option<u32>,
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
    let settings = AccountsSettings::load_from_iter([OsString::from("wait-for-db")])
        .map_err(|e| eyre!("failed to load settings: {e}"))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(run(args, &settings))
}

async fn run(args: CliArgs, settings: &AccountsSettings) -> Result<()> {
    let policy = resolve_policy(&args, settings);
    let database_url = resolve_database_url(args.database_url, settings)?;

    let probe = PostgresProbe::new(database_url);
    let attempts = wait_for_database(&probe, policy).await?;
    info!(attempts, "database is accepting queries");
    Ok(())
}

fn resolve_database_url(flag: Option<String>, settings: &AccountsSettings) -> Result<String> {
    flag.or_else(|| settings.database_url().map(str::to_owned))
        .ok_or_else(|| eyre!("no database URL: pass --database-url or set ACCOUNTS_DATABASE_URL"))
}

fn resolve_policy(args: &CliArgs, settings: &AccountsSettings) -> WaitPolicy {
    let configured = settings.wait_policy();
    WaitPolicy {
        interval: args
            .interval_ms
            .map_or(configured.interval, Duration::from_millis),
        max_attempts: args.max_attempts.or(configured.max_attempts),
    }
}
