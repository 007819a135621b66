//! Reply menus.
//!
//! The bot is stateless across messages: every reply is a pure function of
//! the text of the last message and the freshly resolved role. Button labels
//! are matched exactly and double as the dispatch keys.

mod actions;
mod keyboard;

pub use actions::{ADMIN_STATUS, MEMBER_STATUS, MenuAction, MenuReply, dispatch, greeting};
pub use keyboard::{
    BTN_ADMIN, BTN_BACK, BTN_CREATE_EVENT, BTN_EVENTS, BTN_GAMES, BTN_SIGNUPS, Keyboard, Layout,
    events_keyboard, main_keyboard,
};
