//! Identity store: persistence for chat participants.
//!
//! ## Tables
//!
//! - `users` - One row per Telegram user, unique on `telegram_id`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/bot/migrations/` and embedded in the
//! binary. They run at bot startup unless `AUTO_MIGRATE=false`, or
//! explicitly via:
//! ```bash
//! cargo run -p party-finder-cli -- migrate
//! ```

pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use party_finder_core::{TelegramId, UserId};

use crate::models::User;

pub use memory::InMemoryUserStore;
pub use users::PgUserStore;

/// Embedded schema migrations for the bot database.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx. The store could not be reached or the
    /// statement failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate `telegram_id`).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// The narrow persistence contract the bot needs for users.
///
/// Implementations must enforce uniqueness of `telegram_id`: a second
/// `create` for the same identity fails with [`RepositoryError::Conflict`].
/// There is deliberately no way to clear the admin flag or delete a user.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Look up a user by Telegram id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the store is unreachable.
    async fn find_by_telegram_id(
        &self,
        telegram_id: TelegramId,
    ) -> Result<Option<User>, RepositoryError>;

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the Telegram id already exists.
    /// Returns `RepositoryError::Database` for other store failures.
    async fn create(&self, telegram_id: TelegramId, is_admin: bool)
    -> Result<User, RepositoryError>;

    /// Flag a user as administrator. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other store failures.
    async fn set_admin(&self, id: UserId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply any pending migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "not found");
        assert_eq!(
            RepositoryError::Conflict("telegram_id 7 already exists".to_owned()).to_string(),
            "constraint violation: telegram_id 7 already exists"
        );
        assert!(
            RepositoryError::Database(sqlx::Error::PoolTimedOut)
                .to_string()
                .starts_with("database error: ")
        );
    }

    #[test]
    fn test_migrations_embedded() {
        assert!(MIGRATOR.iter().any(|m| m.description.contains("create users")));
    }
}
