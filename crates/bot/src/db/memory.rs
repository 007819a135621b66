//! In-memory identity store.
//!
//! Enforces the same uniqueness rule as the `users` table. Tests can
//! simulate a store outage, globally or for a single identity, and can make
//! lookups miss a row that exists to replay a lost first-contact race.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use party_finder_core::{TelegramId, UserId};

use super::{IdentityStore, RepositoryError};
use crate::models::User;

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    users: HashMap<TelegramId, User>,
    failing: Vec<TelegramId>,
    stale_lookups: HashMap<TelegramId, usize>,
}

/// Mutex-guarded map of users keyed by Telegram id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl InMemoryUserStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user directly, bypassing the uniqueness check.
    ///
    /// Replaces any existing row for the same identity.
    pub fn seed(&self, telegram_id: TelegramId, is_admin: bool) -> User {
        let mut inner = self.lock();
        let user = inner.new_user(telegram_id, is_admin);
        inner.users.insert(telegram_id, user.clone());
        user
    }

    /// Make every operation fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every operation touching `telegram_id` fail.
    pub fn fail_for(&self, telegram_id: TelegramId) {
        self.lock().failing.push(telegram_id);
    }

    /// Make the next `times` lookups of `telegram_id` report no row, even if one exists.
    ///
    /// Replays another writer inserting the row between a lookup and a create.
    pub fn miss_lookups(&self, telegram_id: TelegramId, times: usize) {
        self.lock().stale_lookups.insert(telegram_id, times);
    }

    /// Current row for `telegram_id`, without going through the failure switches.
    #[must_use]
    pub fn get(&self, telegram_id: TelegramId) -> Option<User> {
        self.lock().users.get(&telegram_id).cloned()
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    /// Returns `true` if no users are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored users ordered by row id.
    #[must_use]
    pub fn snapshot(&self) -> Vec<User> {
        let mut users: Vec<User> = self.lock().users.values().cloned().collect();
        users.sort_by_key(|u| u.id.as_i32());
        users
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }

    fn check_available(&self, inner: &Inner, telegram_id: TelegramId) -> Result<(), RepositoryError> {
        if self.is_unavailable() || inner.failing.contains(&telegram_id) {
            return Err(outage());
        }
        Ok(())
    }
}

fn outage() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl Inner {
    fn new_user(&mut self, telegram_id: TelegramId, is_admin: bool) -> User {
        self.next_id += 1;
        let now = Utc::now();
        User {
            id: UserId::new(self.next_id),
            telegram_id,
            is_admin,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }
}

#[async_trait]
impl IdentityStore for InMemoryUserStore {
    async fn find_by_telegram_id(
        &self,
        telegram_id: TelegramId,
    ) -> Result<Option<User>, RepositoryError> {
        let mut inner = self.lock();
        self.check_available(&inner, telegram_id)?;
        if let Some(remaining) = inner.stale_lookups.get_mut(&telegram_id)
            && *remaining > 0
        {
            *remaining -= 1;
            return Ok(None);
        }
        Ok(inner.users.get(&telegram_id).cloned())
    }

    async fn create(
        &self,
        telegram_id: TelegramId,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let mut inner = self.lock();
        self.check_available(&inner, telegram_id)?;
        if inner.users.contains_key(&telegram_id) {
            return Err(RepositoryError::Conflict(format!(
                "telegram_id {telegram_id} already exists"
            )));
        }
        let user = inner.new_user(telegram_id, is_admin);
        inner.users.insert(telegram_id, user.clone());
        Ok(user)
    }

    async fn set_admin(&self, id: UserId) -> Result<(), RepositoryError> {
        if self.is_unavailable() {
            return Err(outage());
        }
        let mut inner = self.lock();
        let telegram_id = inner
            .users
            .values()
            .find(|u| u.id == id)
            .map(|u| u.telegram_id)
            .ok_or(RepositoryError::NotFound)?;
        self.check_available(&inner, telegram_id)?;

        if let Some(user) = inner.users.get_mut(&telegram_id)
            && !user.is_admin
        {
            user.is_admin = true;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_find() {
        let store = InMemoryUserStore::new();
        let created = store.create(TelegramId::new(1), false).await.unwrap();
        let found = store.find_by_telegram_id(TelegramId::new(1)).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let store = InMemoryUserStore::new();
        store.create(TelegramId::new(1), false).await.unwrap();
        let err = store.create(TelegramId::new(1), true).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let store = InMemoryUserStore::new();
        let a = store.create(TelegramId::new(1), false).await.unwrap();
        let b = store.create(TelegramId::new(2), false).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_set_admin_is_idempotent() {
        let store = InMemoryUserStore::new();
        let user = store.seed(TelegramId::new(7), false);
        store.set_admin(user.id).await.unwrap();
        store.set_admin(user.id).await.unwrap();
        assert!(store.get(TelegramId::new(7)).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_set_admin_unknown_user() {
        let store = InMemoryUserStore::new();
        let err = store.set_admin(UserId::new(99)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_everything() {
        let store = InMemoryUserStore::new();
        store.set_unavailable(true);
        let err = store.find_by_telegram_id(TelegramId::new(1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Database(_)));
        let err = store.create(TelegramId::new(1), false).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Database(_)));
        assert!(store.is_empty());

        store.set_unavailable(false);
        assert!(store.create(TelegramId::new(1), false).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_admin_unavailable_reports_outage_for_unknown_user() {
        let store = InMemoryUserStore::new();
        store.set_unavailable(true);
        let err = store.set_admin(UserId::new(99)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Database(_)));
    }

    #[tokio::test]
    async fn test_missed_lookups_then_row_visible() {
        let store = InMemoryUserStore::new();
        let seeded = store.seed(TelegramId::new(4), false);
        store.miss_lookups(TelegramId::new(4), 2);

        assert!(store.find_by_telegram_id(TelegramId::new(4)).await.unwrap().is_none());
        assert!(store.find_by_telegram_id(TelegramId::new(4)).await.unwrap().is_none());
        let found = store.find_by_telegram_id(TelegramId::new(4)).await.unwrap();
        assert_eq!(found, Some(seeded));
    }

    #[tokio::test]
    async fn test_fail_for_single_identity() {
        let store = InMemoryUserStore::new();
        store.fail_for(TelegramId::new(13));
        assert!(store.find_by_telegram_id(TelegramId::new(13)).await.is_err());
        assert!(store.find_by_telegram_id(TelegramId::new(14)).await.is_ok());
    }

    #[test]
    fn test_snapshot_ordered_by_id() {
        let store = InMemoryUserStore::new();
        store.seed(TelegramId::new(30), false);
        store.seed(TelegramId::new(10), true);
        store.seed(TelegramId::new(20), false);
        let ids: Vec<i64> = store
            .snapshot()
            .iter()
            .map(|u| u.telegram_id.as_i64())
            .collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }
}
