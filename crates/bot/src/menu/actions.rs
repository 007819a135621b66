//! Button-to-action dispatch.

use super::keyboard::{
    BTN_ADMIN, BTN_BACK, BTN_CREATE_EVENT, BTN_EVENTS, BTN_GAMES, BTN_SIGNUPS, Keyboard, Layout,
};

/// Greeting status line for administrators.
pub const ADMIN_STATUS: &str = "Ваши ближайшие игры:";
/// Greeting status line for members.
pub const MEMBER_STATUS: &str = "Вы не подписались ни на одну из игр";

/// A menu action triggered by pressing a reply-keyboard button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// "My event signups".
    Signups,
    /// "My games".
    Games,
    /// "My events" - opens the events submenu.
    Events,
    /// "Create event".
    CreateEvent,
    /// "Back" to the main menu.
    Back,
    /// "Administration".
    Admin,
}

impl MenuAction {
    /// Every action, in main-menu order.
    pub const ALL: [Self; 6] = [
        Self::Signups,
        Self::Games,
        Self::Events,
        Self::CreateEvent,
        Self::Back,
        Self::Admin,
    ];

    /// Match the exact label of a button. Anything else is not an action.
    #[must_use]
    pub fn from_button(text: &str) -> Option<Self> {
        match text {
            BTN_SIGNUPS => Some(Self::Signups),
            BTN_GAMES => Some(Self::Games),
            BTN_EVENTS => Some(Self::Events),
            BTN_CREATE_EVENT => Some(Self::CreateEvent),
            BTN_BACK => Some(Self::Back),
            BTN_ADMIN => Some(Self::Admin),
            _ => None,
        }
    }

    /// The button label that triggers this action.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Signups => BTN_SIGNUPS,
            Self::Games => BTN_GAMES,
            Self::Events => BTN_EVENTS,
            Self::CreateEvent => BTN_CREATE_EVENT,
            Self::Back => BTN_BACK,
            Self::Admin => BTN_ADMIN,
        }
    }

    /// Message body sent in reply.
    #[must_use]
    pub const fn reply_text(self) -> &'static str {
        match self {
            Self::Signups => "Вы записались на следующие события:",
            Self::Games => "Ваши игры:",
            Self::Events => "Ваши события:",
            Self::CreateEvent => "Создание события...",
            Self::Back => "Главное меню",
            Self::Admin => "Панель администратора",
        }
    }

    /// Keyboard layout shown with the reply.
    #[must_use]
    pub const fn layout(self) -> Layout {
        match self {
            Self::Events | Self::CreateEvent => Layout::Events,
            Self::Signups | Self::Games | Self::Back | Self::Admin => Layout::Main,
        }
    }

    /// Build the reply for a user with the given role.
    #[must_use]
    pub fn reply(self, is_admin: bool) -> MenuReply {
        MenuReply {
            text: self.reply_text().to_owned(),
            keyboard: self.layout().keyboard(is_admin),
        }
    }
}

/// Reply text plus the keyboard to show with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuReply {
    /// Message body.
    pub text: String,
    /// Reply keyboard.
    pub keyboard: Keyboard,
}

/// Map the text of a pressed button to a reply.
///
/// Returns `None` for text that is not a known button; the bot stays silent.
#[must_use]
pub fn dispatch(button_text: &str, is_admin: bool) -> Option<MenuReply> {
    MenuAction::from_button(button_text).map(|action| action.reply(is_admin))
}

/// Start-of-conversation greeting with the main menu.
#[must_use]
pub fn greeting(display_name: &str, is_admin: bool) -> MenuReply {
    let status = if is_admin { ADMIN_STATUS } else { MEMBER_STATUS };
    MenuReply {
        text: format!("Привет, {display_name} \n{status}"),
        keyboard: Layout::Main.keyboard(is_admin),
    }
}
