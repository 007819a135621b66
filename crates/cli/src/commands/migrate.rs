//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! pf-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - Full `postgres://` URL, or a host combined with `PORT`,
//!   `POSTGRES_USER`, `POSTGRES_PASSWORD` and `POSTGRES_DB_NAME`
//!
//! Migrations live in `crates/bot/migrations/` and are embedded in the bot
//! library.

use party_finder_bot::db;

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
