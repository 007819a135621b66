//! Unified error handling for the bot.

use thiserror::Error;

use crate::config::ConfigError;
use crate::services::ResolveError;
use crate::telegram::TelegramError;

/// Reply sent when the identity store fails while handling a message.
pub const DATABASE_ERROR_TEXT: &str = "Ошибка при работе с базой данных";

/// Reply sent for any other failure while handling a message.
pub const INTERNAL_ERROR_TEXT: &str = "Что-то пошло не так, попробуйте позже";

/// Application-level error type for the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Role resolution (identity store) failed.
    #[error("Database error: {0}")]
    Database(#[from] ResolveError),

    /// Telegram API operation failed.
    #[error("Telegram error: {0}")]
    Telegram(#[from] TelegramError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BotError {
    /// Text to show the chat user. Never exposes internal details.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Database(_) => DATABASE_ERROR_TEXT,
            Self::Telegram(_) | Self::Config(_) => INTERNAL_ERROR_TEXT,
        }
    }

    /// Log the error and capture it in Sentry.
    pub fn report(&self) {
        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Bot request error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;

    #[test]
    fn test_bot_error_display() {
        let err = BotError::Telegram(TelegramError::Api("Forbidden".to_string()));
        assert_eq!(err.to_string(), "Telegram error: Telegram API error: Forbidden");

        let err = BotError::Config(ConfigError::MissingEnvVar("BOT_TOKEN".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: BOT_TOKEN"
        );
    }

    #[test]
    fn test_store_errors_use_database_text() {
        let err = BotError::from(ResolveError::Store(RepositoryError::Database(
            sqlx::Error::PoolTimedOut,
        )));
        assert_eq!(err.user_message(), DATABASE_ERROR_TEXT);
    }

    #[test]
    fn test_user_message_hides_details() {
        let err = BotError::Telegram(TelegramError::Request("connect: 10.0.0.1".to_string()));
        assert_eq!(err.user_message(), INTERNAL_ERROR_TEXT);
        assert!(!err.user_message().contains("10.0.0.1"));
    }
}
