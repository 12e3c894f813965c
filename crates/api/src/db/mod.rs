//! Database operations for the API's `PostgreSQL` store.
//!
//! # Tables
//!
//! - `users` / `user_passwords` - Accounts and their password hashes
//! - `addresses` - Per-user postal addresses with billing/shipping flags
//! - `sku_groups`, `sku_sizes`, `sku_lines`, `sku_types` - SKU taxonomy
//! - `settings` - Named configuration records
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p goria-cli -- migrate
//! ```
//!
//! All queries use runtime binding (`sqlx::query_as` and friends) with
//! `FromRow` row structs mapped into the domain types in [`crate::models`].

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod addresses;
pub mod settings;
pub mod sku;
pub mod users;

pub use addresses::AddressRepository;
pub use settings::SettingRepository;
pub use sku::{GroupRepository, LineRepository, SizeRepository, TypeRepository};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

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
