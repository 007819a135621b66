//! Inbound message handling.
//!
//! Every text message resolves the sender first (registering them on first
//! contact), then either greets them or dispatches the pressed button.

use tracing::{debug, instrument};

use party_finder_core::TelegramId;

use crate::error::BotError;
use crate::menu::{self, Keyboard, MenuReply};
use crate::state::AppState;

/// Command that starts a conversation.
const START_COMMAND: &str = "/start";

/// A text message from a human sender, stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Chat to reply into.
    pub chat_id: i64,
    /// Telegram identity of the sender.
    pub sender: TelegramId,
    /// Name used in the greeting.
    pub display_name: String,
    /// Raw message text.
    pub text: String,
}

/// A message to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Target chat.
    pub chat_id: i64,
    /// Message body.
    pub text: String,
    /// Reply keyboard, if the reply changes the menu.
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    fn menu(chat_id: i64, reply: MenuReply) -> Self {
        Self {
            chat_id,
            text: reply.text,
            keyboard: Some(reply.keyboard),
        }
    }

    fn error(chat_id: i64, err: &BotError) -> Self {
        Self {
            chat_id,
            text: err.user_message().to_owned(),
            keyboard: None,
        }
    }
}

/// Whether `text` is the start command.
///
/// Accepts `/start`, `/start@SomeBot` and `/start <payload>`.
#[must_use]
pub fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split_once('@').map_or(command, |(name, _)| name);
    command == START_COMMAND
}

/// Handle one inbound message.
///
/// Returns `None` when the bot has nothing to say (text that is not a
/// button). Store failures are reported and answered with the generic
/// database error text.
#[instrument(skip(state, message), fields(telegram_id = %message.sender, chat_id = message.chat_id))]
pub async fn handle_message(state: &AppState, message: &IncomingMessage) -> Option<Reply> {
    match respond(state, message).await {
        Ok(reply) => reply.map(|r| Reply::menu(message.chat_id, r)),
        Err(err) => {
            err.report();
            Some(Reply::error(message.chat_id, &err))
        }
    }
}

async fn respond(
    state: &AppState,
    message: &IncomingMessage,
) -> Result<Option<MenuReply>, BotError> {
    let resolved = state.resolver().resolve(message.sender).await?;

    if is_start_command(&message.text) {
        debug!(is_admin = resolved.is_admin, "Greeting");
        return Ok(Some(menu::greeting(&message.display_name, resolved.is_admin)));
    }

    let reply = menu::dispatch(&message.text, resolved.is_admin);
    if reply.is_none() {
        debug!("Ignoring text that is not a menu button");
    }
    Ok(reply)
}
