//! Business logic services.
//!
//! - [`AdminReconciler`] - Startup pass that flags configured admins in the store
//! - [`RoleResolver`] - Per-message identity lookup, first-contact registration
//!   and admin resolution

pub mod admin_reconciler;
pub mod role_resolver;

pub use admin_reconciler::{AdminReconciler, ReconcileFailure, ReconcileOutcome, ReconcileReport};
pub use role_resolver::{ResolveError, ResolvedUser, RoleResolver};
