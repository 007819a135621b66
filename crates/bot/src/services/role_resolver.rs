//! Role resolution for inbound messages.
//!
//! Maps a Telegram identity to its stored user (creating it on first
//! contact) and decides whether that user is an administrator. The
//! effective flag is the union of the configured admin list and the
//! stored flag; a configured admin whose row still says `false` is
//! promoted in the store on the way through.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use party_finder_core::{AdminConfiguration, TelegramId};

use crate::db::{IdentityStore, RepositoryError};
use crate::models::User;

/// Errors that can occur while resolving a user.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The identity store failed.
    #[error("identity store error: {0}")]
    Store(#[from] RepositoryError),

    /// `create` reported a conflict but the row was still missing on re-read.
    #[error("user {0} conflicted on create but could not be re-read")]
    Vanished(TelegramId),
}

/// A resolved user and their effective admin status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    /// The stored user (possibly just created).
    pub user: User,
    /// Stored flag OR membership in the configured admin list.
    pub is_admin: bool,
}

/// Resolves Telegram identities to users and roles.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn IdentityStore>,
    admins: Arc<AdminConfiguration>,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("admins", &self.admins)
            .finish_non_exhaustive()
    }
}

impl RoleResolver {
    /// Create a resolver over a store and the configured admin list.
    #[must_use]
    pub const fn new(store: Arc<dyn IdentityStore>, admins: Arc<AdminConfiguration>) -> Self {
        Self { store, admins }
    }

    /// Whether `telegram_id` is in the configured admin list.
    #[must_use]
    pub fn is_configured_admin(&self, telegram_id: TelegramId) -> bool {
        self.admins.contains(telegram_id)
    }

    /// Resolve a Telegram identity, creating the user on first contact.
    ///
    /// Concurrent first contact for the same identity is settled by the
    /// store's uniqueness constraint: a `Conflict` on create is retried once
    /// as a lookup.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Store` if the store fails, or
    /// `ResolveError::Vanished` if a conflicting row cannot be re-read.
    #[instrument(skip(self), fields(telegram_id = %telegram_id))]
    pub async fn resolve(&self, telegram_id: TelegramId) -> Result<ResolvedUser, ResolveError> {
        let configured = self.is_configured_admin(telegram_id);

        let user = match self.store.find_by_telegram_id(telegram_id).await? {
            Some(user) => user,
            None => match self.store.create(telegram_id, configured).await {
                Ok(user) => {
                    info!(user_id = %user.id, is_admin = configured, "Registered new user");
                    return Ok(ResolvedUser {
                        is_admin: user.is_admin,
                        user,
                    });
                }
                Err(RepositoryError::Conflict(reason)) => {
                    debug!(%reason, "Lost first-contact race, re-reading");
                    self.store
                        .find_by_telegram_id(telegram_id)
                        .await?
                        .ok_or(ResolveError::Vanished(telegram_id))?
                }
                Err(e) => return Err(e.into()),
            },
        };

        self.apply_configured_role(user, configured).await
    }

    /// Merge the configured role into an existing user, persisting a promotion.
    async fn apply_configured_role(
        &self,
        mut user: User,
        configured: bool,
    ) -> Result<ResolvedUser, ResolveError> {
        if configured && !user.is_admin {
            self.store.set_admin(user.id).await?;
            info!(user_id = %user.id, "Promoted configured admin");
            user.is_admin = true;
        }

        Ok(ResolvedUser {
            is_admin: user.is_admin || configured,
            user,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryUserStore;

    fn resolver(store: &Arc<InMemoryUserStore>, admins: &[i64]) -> RoleResolver {
        let admins: AdminConfiguration = admins.iter().copied().map(TelegramId::new).collect();
        RoleResolver::new(store.clone(), Arc::new(admins))
    }

    #[tokio::test]
    async fn test_unseen_user_created_as_member() {
        let store = Arc::new(InMemoryUserStore::new());
        let resolved = resolver(&store, &[]).resolve(TelegramId::new(99)).await.unwrap();

        assert!(!resolved.is_admin);
        assert_eq!(resolved.user.telegram_id, TelegramId::new(99));
        assert!(!store.get(TelegramId::new(99)).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_unseen_configured_admin_created_as_admin() {
        let store = Arc::new(InMemoryUserStore::new());
        let resolved = resolver(&store, &[5]).resolve(TelegramId::new(5)).await.unwrap();

        assert!(resolved.is_admin);
        assert!(store.get(TelegramId::new(5)).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_stored_admin_not_in_config_stays_admin() {
        let store = Arc::new(InMemoryUserStore::new());
        store.seed(TelegramId::new(8), true);

        let resolved = resolver(&store, &[]).resolve(TelegramId::new(8)).await.unwrap();
        assert!(resolved.is_admin);
    }

    #[tokio::test]
    async fn test_configured_admin_promoted_in_store() {
        let store = Arc::new(InMemoryUserStore::new());
        let seeded = store.seed(TelegramId::new(7), false);

        let resolved = resolver(&store, &[7]).resolve(TelegramId::new(7)).await.unwrap();
        assert!(resolved.is_admin);
        assert_eq!(resolved.user.id, seeded.id);
        assert!(store.get(TelegramId::new(7)).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = Arc::new(InMemoryUserStore::new());
        store.set_unavailable(true);

        let err = resolver(&store, &[1]).resolve(TelegramId::new(1)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Store(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn test_create_conflict_rereads_existing_row() {
        let store = Arc::new(InMemoryUserStore::new());
        let seeded = store.seed(TelegramId::new(7), false);
        store.miss_lookups(TelegramId::new(7), 1);

        let resolved = resolver(&store, &[7]).resolve(TelegramId::new(7)).await.unwrap();

        assert_eq!(resolved.user.id, seeded.id);
        assert!(resolved.is_admin);
        assert_eq!(store.len(), 1);
        assert!(store.get(TelegramId::new(7)).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_create_conflict_member_keeps_stored_role() {
        let store = Arc::new(InMemoryUserStore::new());
        let seeded = store.seed(TelegramId::new(12), false);
        store.miss_lookups(TelegramId::new(12), 1);

        let resolved = resolver(&store, &[]).resolve(TelegramId::new(12)).await.unwrap();

        assert_eq!(resolved.user, seeded);
        assert!(!resolved.is_admin);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_conflict_with_unreadable_row_is_vanished() {
        let store = Arc::new(InMemoryUserStore::new());
        store.seed(TelegramId::new(7), false);
        store.miss_lookups(TelegramId::new(7), 2);

        let err = resolver(&store, &[]).resolve(TelegramId::new(7)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Vanished(id) if id == TelegramId::new(7)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_debug_hides_store() {
        let store = Arc::new(InMemoryUserStore::new());
        let debug = format!("{:?}", resolver(&store, &[3]));
        assert!(debug.contains("RoleResolver"));
        assert!(debug.contains('3'));
    }
}
