//! PostgreSQL persistence for form configuration versions, users and their
//! submitted answers.
//!
//! Exposes the connection pool helpers used at startup, row models,
//! zero-sized repositories, and [`PgConfigStore`], the database-backed
//! implementation of the engine's storage port.

pub mod models;
pub mod repositories;
pub mod store;

pub use store::PgConfigStore;

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

pub type DbPool = sqlx::PgPool;

/// Connection pool settings loaded from environment variables.
///
/// | Env var                   | Default | Description                           |
/// |---------------------------|---------|---------------------------------------|
/// | `DATABASE_URL`            | --      | Postgres connection string (required) |
/// | `DB_MAX_CONNECTIONS`      | `20`    | Pool size                             |
/// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`     | Wait for a free connection            |
/// | `DB_STATEMENT_TIMEOUT_MS` | `5000`  | Per-statement server-side timeout     |
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub statement_timeout_ms: u64,
}

impl DbConfig {
    /// Load pool settings from environment variables.
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is unset or a numeric variable cannot be parsed.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let acquire_timeout_secs: u64 = std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("DB_ACQUIRE_TIMEOUT_SECS must be a valid u64");

        let statement_timeout_ms: u64 = std::env::var("DB_STATEMENT_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("DB_STATEMENT_TIMEOUT_MS must be a valid u64");

        Self {
            database_url,
            max_connections,
            acquire_timeout_secs,
            statement_timeout_ms,
        }
    }
}

/// Create a connection pool from the given settings.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(&config.database_url)?;
    connect_pool(options, config).await
}

/// Open a pool over already-parsed connect options, applying the pool
/// size and timeouts from `config`. `config.database_url` is ignored.
///
/// The statement timeout is set as a session parameter on every connection.
pub async fn connect_pool(
    options: PgConnectOptions,
    config: &DbConfig,
) -> Result<DbPool, sqlx::Error> {
    let options =
        options.options([("statement_timeout", config.statement_timeout_ms.to_string())]);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_with(options)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
