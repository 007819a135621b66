//! User domain type.

use chrono::{DateTime, Utc};

use party_finder_core::{TelegramId, UserId};

/// A chat participant known to the bot (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned row ID.
    pub id: UserId,
    /// Telegram user id. Unique and never changed once stored.
    pub telegram_id: TelegramId,
    /// Stored administrator flag. Only ever flips from `false` to `true`.
    pub is_admin: bool,
    /// When the user was first seen.
    pub created_at: DateTime<Utc>,
    /// When the row last changed.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Never set by the bot itself.
    pub deleted_at: Option<DateTime<Utc>>,
}
