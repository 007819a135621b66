//! Telegram Bot API transport.
//!
//! This module provides:
//! - [`TelegramClient`] for polling updates and sending messages
//! - Wire types for updates, messages and reply keyboards
//!
//! The rest of the bot only sees [`IncomingMessage`](crate::handlers::IncomingMessage)
//! and [`Reply`](crate::handlers::Reply); conversion happens here.

mod client;
mod error;
mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use types::{
    ApiResponse, Chat, GetUpdates, KeyboardButton, Message, ReplyKeyboardMarkup, SendMessage,
    Update, User,
};

use party_finder_core::TelegramId;

use crate::handlers::IncomingMessage;

impl Update {
    /// Extract a text message from a human sender, if this update carries one.
    #[must_use]
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message = self.message?;
        let text = message.text?;
        let from = message.from.filter(|u| !u.is_bot)?;

        Some(IncomingMessage {
            chat_id: message.chat.id,
            sender: TelegramId::new(from.id),
            display_name: from.display_name().to_owned(),
            text,
        })
    }
}
