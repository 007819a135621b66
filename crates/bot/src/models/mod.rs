//! Domain models for the bot.
//!
//! These types represent validated domain objects, separate from
//! database row types and Telegram wire types.

pub mod user;

pub use user::User;
