//! Admin management commands.
//!
//! # Usage
//!
//! ```bash
//! # Reconcile the ids in ADMIN_TELEGRAM_IDS
//! pf-cli admins reconcile
//!
//! # Also flag extra ids for this run
//! pf-cli admins reconcile --id 123456789 --id 987654321
//! ```

use party_finder_bot::config;
use party_finder_bot::db::PgUserStore;
use party_finder_bot::services::{AdminReconciler, ReconcileOutcome, ReconcileReport};
use party_finder_core::{AdminConfiguration, TelegramId};

use super::{CommandError, connect};

/// Run one reconciliation pass over the configured admins plus `extra`.
///
/// # Errors
///
/// Returns `CommandError::Reconcile` if any identity failed, after printing
/// the full report.
pub async fn reconcile(extra: &[TelegramId]) -> Result<(), CommandError> {
    let admins: AdminConfiguration = config::admins_from_env()
        .iter()
        .chain(extra.iter().copied())
        .collect();

    if admins.is_empty() {
        tracing::warn!("No admins configured; set ADMIN_TELEGRAM_IDS or pass --id");
        return Ok(());
    }

    let pool = connect().await?;
    let store = PgUserStore::new(pool);
    let report = AdminReconciler::new(&store).reconcile(&admins).await;

    print_report(&report);

    if report.is_complete() {
        Ok(())
    } else {
        Err(CommandError::Reconcile(report.failures.len()))
    }
}

#[allow(clippy::print_stdout)]
fn print_report(report: &ReconcileReport) {
    for (telegram_id, outcome) in &report.outcomes {
        let label = match outcome {
            ReconcileOutcome::Created => "created",
            ReconcileOutcome::Promoted => "promoted",
            ReconcileOutcome::Unchanged => "unchanged",
        };
        println!("{telegram_id}\t{label}");
    }
    for failure in &report.failures {
        println!("{}\tfailed: {}", failure.telegram_id, failure.error);
    }
}
