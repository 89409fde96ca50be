//! Store access
//!
//! One shared SQLite pool serves the whole engine; every service clones the
//! pool handle and connections are released deterministically when each
//! query or transaction finishes. The schema is applied through embedded
//! migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::error::AppResult;

/// Embedded migrations from `backend/migrations`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Connect to the configured database and bring the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> AppResult<SqlitePool> {
    tracing::info!(url = %config.url, "connecting to database");

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!("database ready");

    Ok(pool)
}

/// In-memory database with the full schema applied, for tests and demos.
///
/// A single connection keeps every handle on the same memory store.
pub async fn connect_in_memory() -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}
