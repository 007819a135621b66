//! `PostgreSQL` user repository.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use party_finder_core::{TelegramId, UserId};

use super::{IdentityStore, RepositoryError};
use crate::models::User;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    telegram_id: i64,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            telegram_id: TelegramId::new(row.telegram_id),
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Identity store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl IdentityStore for PgUserStore {
    #[instrument(skip(self), fields(telegram_id = %telegram_id))]
    async fn find_by_telegram_id(
        &self,
        telegram_id: TelegramId,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, telegram_id, is_admin, created_at, updated_at, deleted_at
            FROM users
            WHERE telegram_id = $1
            ",
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(found = row.is_some(), "Looked up user");
        Ok(row.map(User::from))
    }

    #[instrument(skip(self), fields(telegram_id = %telegram_id))]
    async fn create(
        &self,
        telegram_id: TelegramId,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (telegram_id, is_admin)
            VALUES ($1, $2)
            RETURNING id, telegram_id, is_admin, created_at, updated_at, deleted_at
            ",
        )
        .bind(telegram_id)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "telegram_id {telegram_id} already exists"
                ));
            }
            RepositoryError::Database(e)
        })?;

        info!(user_id = row.id, is_admin, "Created user");
        Ok(row.into())
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn set_admin(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET is_admin = TRUE, updated_at = now()
            WHERE id = $1 AND is_admin = FALSE
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!("Promoted user to admin");
            return Ok(());
        }

        // Nothing changed: either already an admin or the row is gone
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}
