//! Startup reconciliation of the configured admin list.
//!
//! Every configured identity ends up with a stored row flagged as admin.
//! Existing admins are never downgraded. Entries are processed in order and
//! independently: a store failure on one identity is recorded in the report
//! and the pass moves on to the next.

use tracing::{info, instrument, warn};

use party_finder_core::{AdminConfiguration, TelegramId};

use crate::db::{IdentityStore, RepositoryError};

/// What reconciliation did for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No row existed; one was created with `is_admin = true`.
    Created,
    /// A member row existed and was flagged as admin.
    Promoted,
    /// The row was already an admin.
    Unchanged,
}

/// A per-identity failure during reconciliation.
#[derive(Debug)]
pub struct ReconcileFailure {
    /// The identity that could not be reconciled.
    pub telegram_id: TelegramId,
    /// The store error encountered.
    pub error: RepositoryError,
}

impl std::fmt::Display for ReconcileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "admin {}: {}", self.telegram_id, self.error)
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Successful identities with what was done, in configured order.
    pub outcomes: Vec<(TelegramId, ReconcileOutcome)>,
    /// Identities that failed, in configured order.
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    /// Returns `true` if every identity was reconciled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of identities with the given outcome.
    #[must_use]
    pub fn count(&self, outcome: ReconcileOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Brings stored admin flags into agreement with the configured list.
pub struct AdminReconciler<'a> {
    store: &'a dyn IdentityStore,
}

impl<'a> AdminReconciler<'a> {
    /// Create a reconciler over an identity store.
    #[must_use]
    pub const fn new(store: &'a dyn IdentityStore) -> Self {
        Self { store }
    }

    /// Reconcile every configured admin, collecting failures.
    #[instrument(skip(self, admins), fields(count = admins.len()))]
    pub async fn reconcile(&self, admins: &AdminConfiguration) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for telegram_id in admins.iter() {
            match self.reconcile_one(telegram_id).await {
                Ok(outcome) => {
                    match outcome {
                        ReconcileOutcome::Created => {
                            info!(%telegram_id, "Created admin");
                        }
                        ReconcileOutcome::Promoted => {
                            info!(%telegram_id, "Updated user to admin");
                        }
                        ReconcileOutcome::Unchanged => {}
                    }
                    report.outcomes.push((telegram_id, outcome));
                }
                Err(error) => {
                    warn!(%telegram_id, %error, "Failed to reconcile admin");
                    report.failures.push(ReconcileFailure { telegram_id, error });
                }
            }
        }

        info!(
            created = report.count(ReconcileOutcome::Created),
            promoted = report.count(ReconcileOutcome::Promoted),
            unchanged = report.count(ReconcileOutcome::Unchanged),
            failed = report.failures.len(),
            "Admin reconciliation finished"
        );
        report
    }

    /// Reconcile a single identity.
    ///
    /// # Errors
    ///
    /// Returns the first store error hit for this identity.
    pub async fn reconcile_one(
        &self,
        telegram_id: TelegramId,
    ) -> Result<ReconcileOutcome, RepositoryError> {
        let existing = match self.store.find_by_telegram_id(telegram_id).await? {
            Some(user) => user,
            None => match self.store.create(telegram_id, true).await {
                Ok(_) => return Ok(ReconcileOutcome::Created),
                // Someone registered this identity between lookup and insert
                Err(RepositoryError::Conflict(_)) => self
                    .store
                    .find_by_telegram_id(telegram_id)
                    .await?
                    .ok_or(RepositoryError::NotFound)?,
                Err(e) => return Err(e),
            },
        };

        if existing.is_admin {
            return Ok(ReconcileOutcome::Unchanged);
        }

        self.store.set_admin(existing.id).await?;
        Ok(ReconcileOutcome::Promoted)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::InMemoryUserStore;

    fn admins(raw: &[i64]) -> AdminConfiguration {
        raw.iter().copied().map(TelegramId::new).collect()
    }

    #[tokio::test]
    async fn test_creates_missing_admin() {
        let store = InMemoryUserStore::new();
        let report = AdminReconciler::new(&store).reconcile(&admins(&[42])).await;

        assert!(report.is_complete());
        assert_eq!(report.outcomes, vec![(TelegramId::new(42), ReconcileOutcome::Created)]);
        assert!(store.get(TelegramId::new(42)).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_promotes_existing_member() {
        let store = InMemoryUserStore::new();
        store.seed(TelegramId::new(7), false);

        let report = AdminReconciler::new(&store).reconcile(&admins(&[7])).await;
        assert_eq!(report.count(ReconcileOutcome::Promoted), 1);
        assert!(store.get(TelegramId::new(7)).unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_existing_admin_unchanged() {
        let store = InMemoryUserStore::new();
        let before = store.seed(TelegramId::new(3), true);

        let report = AdminReconciler::new(&store).reconcile(&admins(&[3])).await;
        assert_eq!(report.count(ReconcileOutcome::Unchanged), 1);
        assert_eq!(store.get(TelegramId::new(3)).unwrap(), before);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_entries() {
        let store = InMemoryUserStore::new();
        store.fail_for(TelegramId::new(2));

        let report = AdminReconciler::new(&store).reconcile(&admins(&[1, 2, 3])).await;

        assert!(!report.is_complete());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].telegram_id, TelegramId::new(2));
        assert!(report.failures[0].to_string().starts_with("admin 2: database error"));
        assert!(store.get(TelegramId::new(1)).unwrap().is_admin);
        assert!(store.get(TelegramId::new(3)).unwrap().is_admin);
        assert!(store.get(TelegramId::new(2)).is_none());
    }

    #[tokio::test]
    async fn test_create_conflict_promotes_existing_member() {
        let store = InMemoryUserStore::new();
        let seeded = store.seed(TelegramId::new(9), false);
        store.miss_lookups(TelegramId::new(9), 1);

        let outcome = AdminReconciler::new(&store)
            .reconcile_one(TelegramId::new(9))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Promoted);
        assert_eq!(store.len(), 1);
        let stored = store.get(TelegramId::new(9)).unwrap();
        assert_eq!(stored.id, seeded.id);
        assert!(stored.is_admin);
    }

    #[tokio::test]
    async fn test_create_conflict_with_existing_admin_is_unchanged() {
        let store = InMemoryUserStore::new();
        store.seed(TelegramId::new(9), true);
        store.miss_lookups(TelegramId::new(9), 1);

        let outcome = AdminReconciler::new(&store)
            .reconcile_one(TelegramId::new(9))
            .await
            .unwrap();
        assert_eq!(outcome, ReconcileOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_create_conflict_with_unreadable_row_is_a_failure() {
        let store = InMemoryUserStore::new();
        store.seed(TelegramId::new(9), false);
        store.miss_lookups(TelegramId::new(9), 2);

        let report = AdminReconciler::new(&store).reconcile(&admins(&[9, 10])).await;

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].error, RepositoryError::NotFound));
        assert_eq!(report.outcomes, vec![(TelegramId::new(10), ReconcileOutcome::Created)]);
    }

    #[tokio::test]
    async fn test_empty_configuration_is_noop() {
        let store = InMemoryUserStore::new();
        let report = AdminReconciler::new(&store).reconcile(&AdminConfiguration::empty()).await;
        assert!(report.is_complete());
        assert!(report.outcomes.is_empty());
        assert!(store.is_empty());
    }
}
