//! Telegram Bot API client.
//!
//! Provides methods for long-polling updates and sending messages with
//! reply keyboards.

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use super::error::TelegramError;
use super::types::{ApiResponse, GetUpdates, SendMessage, Update, User};
use crate::menu::Keyboard;

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Slack on top of the long-poll timeout before the HTTP request gives up.
const POLL_REQUEST_GRACE: Duration = Duration::from_secs(10);

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    /// HTTP client.
    client: Client,
    /// Bot token for authentication.
    token: SecretString,
    /// API base URL (overridable for tests).
    base_url: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a new Telegram client.
    #[must_use]
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, TELEGRAM_API_BASE)
    }

    /// Create a client against a different API host.
    #[must_use]
    pub fn with_base_url(token: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token,
            base_url: base_url.into(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.base_url,
            self.token.expose_secret()
        )
    }

    async fn call<B, T>(
        &self,
        method: &str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.api_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // reqwest errors include the URL, which carries the token
        let response = request
            .send()
            .await
            .map_err(|e| TelegramError::Request(e.without_url().to_string()))?;

        let result: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::Response(e.without_url().to_string()))?;

        if !result.ok {
            error!(
                method,
                error_code = ?result.error_code,
                description = ?result.description,
                "Telegram API error"
            );
            return Err(TelegramError::Api(
                result
                    .description
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        result
            .result
            .ok_or_else(|| TelegramError::Response(format!("{method}: missing result")))
    }

    /// Fetch the bot's own account.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the token is rejected.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-poll for message updates starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or Telegram returns an error.
    #[instrument(skip(self), fields(offset = offset))]
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: vec!["message"],
        };

        let updates: Vec<Update> = self
            .call("getUpdates", &body, Some(timeout + POLL_REQUEST_GRACE))
            .await?;

        debug!(count = updates.len(), "Received updates");
        Ok(updates)
    }

    /// Send a text message, optionally with a reply keyboard.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or Telegram returns an error.
    #[instrument(skip(self, text, keyboard), fields(chat_id = chat_id))]
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TelegramError> {
        let body = SendMessage {
            chat_id,
            text: text.to_owned(),
            reply_markup: keyboard.map(Into::into),
        };

        let _: serde_json::Value = self.call("sendMessage", &body, None).await?;
        debug!("Message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = TelegramClient::new(SecretString::from("123:ABC"));
        assert_eq!(
            client.api_url("getMe"),
            "https://api.telegram.org/bot123:ABC/getMe"
        );
    }

    #[test]
    fn test_api_url_custom_base() {
        let client =
            TelegramClient::with_base_url(SecretString::from("1:x"), "http://127.0.0.1:8081");
        assert_eq!(
            client.api_url("sendMessage"),
            "http://127.0.0.1:8081/bot1:x/sendMessage"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = TelegramClient::new(SecretString::from("987654:super-secret-token"));
        let debug = format!("{client:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }
}
