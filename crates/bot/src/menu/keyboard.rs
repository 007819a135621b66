//! Reply keyboard layouts.

use serde::Serialize;

/// "My event signups" button.
pub const BTN_SIGNUPS: &str = "Мои записи на события";
/// "My games" button.
pub const BTN_GAMES: &str = "Мои игры";
/// "My events" button.
pub const BTN_EVENTS: &str = "Мои события";
/// "Administration" button (admins only).
pub const BTN_ADMIN: &str = "Администрирование";
/// "Create event" button.
pub const BTN_CREATE_EVENT: &str = "Создать событие";
/// "Back" button.
pub const BTN_BACK: &str = "Назад";

/// An ordered sequence of button rows rendered as a reply keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Keyboard {
    rows: Vec<Vec<&'static str>>,
}

impl Keyboard {
    /// Build a keyboard from rows of labels.
    #[must_use]
    pub const fn new(rows: Vec<Vec<&'static str>>) -> Self {
        Self { rows }
    }

    /// Rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<&'static str>] {
        &self.rows
    }

    /// Whether any row contains `label`.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.rows.iter().flatten().any(|b| *b == label)
    }
}

/// The two keyboard layouts the bot renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Signups / Games+Events, plus Admin for administrators.
    Main,
    /// Create Event / Back.
    Events,
}

impl Layout {
    /// Render the layout for a user with the given role.
    #[must_use]
    pub fn keyboard(self, is_admin: bool) -> Keyboard {
        match self {
            Self::Main => main_keyboard(is_admin),
            Self::Events => events_keyboard(),
        }
    }
}

/// Main menu: `[Signups]`, `[Games, Events]`, then `[Admin]` for administrators.
#[must_use]
pub fn main_keyboard(is_admin: bool) -> Keyboard {
    let mut rows = vec![vec![BTN_SIGNUPS], vec![BTN_GAMES, BTN_EVENTS]];
    if is_admin {
        rows.push(vec![BTN_ADMIN]);
    }
    Keyboard::new(rows)
}

/// Events submenu: `[Create Event]`, `[Back]`.
#[must_use]
pub fn events_keyboard() -> Keyboard {
    Keyboard::new(vec![vec![BTN_CREATE_EVENT], vec![BTN_BACK]])
}
