//! SQLite persistence: pool setup, schema, and the store implementation.

pub mod catalog;
pub mod error;
pub mod schema;
pub mod store;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use catalog::BookFilter;
pub use error::{CatalogError, ProvisionError};
pub use store::SqliteStore;

/// Open a pool for `database_url` and bring the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    schema::migrate(&pool).await?;
    tracing::info!(database_url, "database ready");
    Ok(pool)
}

/// Private in-memory database for tests and local experiments.
///
/// Each SQLite in-memory connection is its own database, so the pool is
/// pinned to a single connection that never expires.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    schema::migrate(&pool).await?;
    Ok(pool)
}
