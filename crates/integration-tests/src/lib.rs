//! Integration tests for the party finder bot.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p party-finder-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `admin_reconciliation` - Startup admin pass against the identity store
//! - `role_resolution` - First contact, promotion and concurrent registration
//! - `message_handling` - Greeting, menu dispatch and error replies end to end
//!
//! Everything runs against [`InMemoryUserStore`]; no database or network is
//! needed.

use std::sync::Arc;

use party_finder_bot::db::InMemoryUserStore;
use party_finder_bot::handlers::IncomingMessage;
use party_finder_bot::state::AppState;
use party_finder_core::{AdminConfiguration, TelegramId};

/// Shared fixture: an in-memory store and the state built over it.
pub struct TestContext {
    /// Store the state was built over, for seeding and inspection.
    pub store: Arc<InMemoryUserStore>,
    /// Application state handed to the handlers.
    pub state: AppState,
}

impl TestContext {
    /// Build a context with the given configured admin ids.
    #[must_use]
    pub fn new(admins: &[i64]) -> Self {
        let store = Arc::new(InMemoryUserStore::new());
        let state = AppState::new(store.clone(), admin_config(admins));
        Self { store, state }
    }
}

/// Build an admin list from raw ids.
#[must_use]
pub fn admin_config(ids: &[i64]) -> AdminConfiguration {
    ids.iter().copied().map(TelegramId::new).collect()
}

/// A private-chat text message from `sender`.
#[must_use]
pub fn text_from(sender: i64, display_name: &str, text: &str) -> IncomingMessage {
    IncomingMessage {
        chat_id: sender,
        sender: TelegramId::new(sender),
        display_name: display_name.to_owned(),
        text: text.to_owned(),
    }
}
