//! Database operations for the Salesdesk `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Sellers (sign-in accounts) with Argon2 password hashes
//! - `products` - Shared catalog with stock and price
//! - `clients` - Clients owned by the seller who registered them
//! - `orders` - Orders owned by a seller, placed for one of their clients
//! - `order_items` - Line items with the unit price captured at reservation
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p salesdesk-cli -- migrate
//! ```

pub mod clients;
pub mod orders;
pub mod products;
pub mod reports;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email, row still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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

/// Map a write error, turning unique and foreign key violations into
/// `RepositoryError::Conflict` with the given messages.
pub(crate) fn map_write_error(
    err: sqlx::Error,
    on_unique: &str,
    on_foreign_key: &str,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(on_unique.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(on_foreign_key.to_owned());
        }
    }
    RepositoryError::Database(err)
}
