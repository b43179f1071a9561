//! Database pool for session storage.
//!
//! The storefront keeps no domain tables; `PostgreSQL` only backs
//! tower-sessions (the durable cart line list and the session-scoped
//! checkout draft live inside session records). The sessions table is
//! created by `PostgresStore::migrate` at startup.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
