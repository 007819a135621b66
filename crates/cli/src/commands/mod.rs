//! Subcommand implementations.

pub mod admins;
pub mod migrate;

use sqlx::PgPool;
use thiserror::Error;

use party_finder_bot::config::{self, ConfigError};
use party_finder_bot::db;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Some configured admins could not be reconciled.
    #[error("{0} admin(s) could not be reconciled")]
    Reconcile(usize),
}

/// Connect using the same `DATABASE_URL` rules as the bot.
async fn connect() -> Result<PgPool, CommandError> {
    let database_url = config::database_url_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url, 2).await?)
}
