//! Party Finder bot.
//!
//! Long-polls the Telegram Bot API and answers the reply-keyboard menu.
//!
//! # Startup
//!
//! 1. Load configuration (`BOT_TOKEN` is required)
//! 2. Connect to `PostgreSQL` and apply migrations (unless `AUTO_MIGRATE=false`)
//! 3. Flag every id in `ADMIN_TELEGRAM_IDS` as admin in the store
//! 4. Poll for updates until Ctrl+C or SIGTERM

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use party_finder_bot::config::BotConfig;
use party_finder_bot::db::{self, PgUserStore};
use party_finder_bot::error::BotError;
use party_finder_bot::poller;
use party_finder_bot::services::AdminReconciler;
use party_finder_bot::state::AppState;
use party_finder_bot::telegram::TelegramClient;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &BotConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "party_finder_bot=info".into());

    let is_json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
#[allow(clippy::print_stderr)] // tracing is not up until config has loaded
async fn main() -> ExitCode {
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", BotError::from(e));
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    if config.auto_migrate {
        db::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    } else {
        tracing::info!("AUTO_MIGRATE disabled, skipping migrations");
    }

    let store = Arc::new(PgUserStore::new(pool));

    // Failures are logged per identity; the bot still starts
    let report = AdminReconciler::new(store.as_ref())
        .reconcile(&config.admins)
        .await;
    for failure in &report.failures {
        tracing::warn!("Admin reconciliation failed for {failure}");
    }

    let client = TelegramClient::new(config.bot_token.clone());
    match client.get_me().await {
        Ok(me) => tracing::info!(bot_id = me.id, username = ?me.username, "Authorized"),
        Err(e) => return Err(BotError::from(e).into()),
    }

    let state = AppState::new(store, config.admins.clone());
    poller::run(state, client, config.poll_timeout, shutdown_signal()).await;

    tracing::info!("Bot stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping poller");
}
