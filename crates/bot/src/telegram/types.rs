//! Telegram Bot API types.
//!
//! These types represent the subset of the Bot API the bot uses:
//! receiving text messages and replying with a reply keyboard.
//!
//! See: <https://core.telegram.org/bots/api>

use serde::{Deserialize, Serialize};

use crate::menu::Keyboard;

/// Envelope returned by every Bot API method.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful.
    pub ok: bool,
    /// Method result when `ok` is true.
    pub result: Option<T>,
    /// Error description if not ok.
    #[serde(default)]
    pub description: Option<String>,
    /// Numeric error code if not ok.
    #[serde(default)]
    pub error_code: Option<i32>,
}

/// An incoming update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier, used as the polling offset.
    pub update_id: i64,
    /// New incoming message, if this update carries one.
    #[serde(default)]
    pub message: Option<Message>,
}

/// A message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message identifier inside the chat.
    pub message_id: i64,
    /// Sender. Empty for messages sent to channels.
    #[serde(default)]
    pub from: Option<User>,
    /// Chat the message belongs to.
    pub chat: Chat,
    /// Text of the message.
    #[serde(default)]
    pub text: Option<String>,
}

/// A Telegram user or bot.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Whether this user is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// First name.
    pub first_name: String,
    /// Username, without the leading `@`.
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Name to greet the user by: username, else first name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.first_name)
    }
}

/// A chat.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Unique chat identifier.
    pub id: i64,
}

/// Reply keyboard markup.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyKeyboardMarkup {
    /// Rows of buttons.
    pub keyboard: Vec<Vec<KeyboardButton>>,
    /// Ask clients to shrink the keyboard to fit its buttons.
    pub resize_keyboard: bool,
}

/// A reply keyboard button that sends its label as text.
#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    /// Button label.
    pub text: String,
}

impl From<&Keyboard> for ReplyKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            keyboard: keyboard
                .rows()
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: (*label).to_owned(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    /// Target chat.
    pub chat_id: i64,
    /// Message body.
    pub text: String,
    /// Optional reply keyboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

/// Body of a `getUpdates` call.
#[derive(Debug, Clone, Serialize)]
pub struct GetUpdates {
    /// First update to return.
    pub offset: i64,
    /// Long-poll timeout in seconds.
    pub timeout: u64,
    /// Update kinds to receive.
    pub allowed_updates: Vec<&'static str>,
}
