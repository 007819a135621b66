//! Core types for the party finder bot.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod admin;
pub mod id;
pub mod telegram_id;

pub use admin::AdminConfiguration;
pub use id::UserId;
pub use telegram_id::{TelegramId, TelegramIdError};
