//! Application state shared across message handlers.

use std::sync::Arc;

use party_finder_core::AdminConfiguration;

use crate::db::IdentityStore;
use crate::services::RoleResolver;

/// Application state shared across all handlers.
///
/// Cheap to clone; each in-flight update holds its own copy.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn IdentityStore>,
    admins: Arc<AdminConfiguration>,
    resolver: RoleResolver,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("admins", &self.inner.admins)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state over an identity store and the configured admin list.
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>, admins: AdminConfiguration) -> Self {
        let admins = Arc::new(admins);
        let resolver = RoleResolver::new(Arc::clone(&store), Arc::clone(&admins));
        Self {
            inner: Arc::new(AppStateInner {
                store,
                admins,
                resolver,
            }),
        }
    }

    /// The identity store.
    #[must_use]
    pub fn store(&self) -> &dyn IdentityStore {
        self.inner.store.as_ref()
    }

    /// Admin ids from configuration.
    #[must_use]
    pub fn admins(&self) -> &AdminConfiguration {
        &self.inner.admins
    }

    /// Resolver for per-message role lookups.
    #[must_use]
    pub fn resolver(&self) -> &RoleResolver {
        &self.inner.resolver
    }
}
