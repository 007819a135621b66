//! Operator-supplied administrator list.

use serde::{Deserialize, Serialize};

use super::telegram_id::TelegramId;

/// Ordered set of Telegram identities granted administrator status at startup.
///
/// Order is the order the operator listed them in; duplicates keep their
/// first position. The list is read-only once built and defines "configured
/// admin" membership independently of what the store says.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminConfiguration(Vec<TelegramId>);

impl AdminConfiguration {
    /// An empty admin list.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Whether `id` is a configured administrator.
    #[must_use]
    pub fn contains(&self, id: TelegramId) -> bool {
        self.0.contains(&id)
    }

    /// Iterate identities in configured order.
    pub fn iter(&self) -> impl Iterator<Item = TelegramId> + '_ {
        self.0.iter().copied()
    }

    /// Number of configured administrators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no administrators are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Identities as a slice, in configured order.
    #[must_use]
    pub fn as_slice(&self) -> &[TelegramId] {
        &self.0
    }
}

impl FromIterator<TelegramId> for AdminConfiguration {
    fn from_iter<I: IntoIterator<Item = TelegramId>>(iter: I) -> Self {
        let mut ids = Vec::new();
        for id in iter {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self(ids)
    }
}

impl From<Vec<TelegramId>> for AdminConfiguration {
    fn from(ids: Vec<TelegramId>) -> Self {
        ids.into_iter().collect()
    }
}
