//! Party Finder CLI - Database migrations and admin management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! pf-cli migrate
//!
//! # Flag configured admins in the store
//! pf-cli admins reconcile --id 123456789
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admins reconcile` - Create or promote the configured admins

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use party_finder_core::TelegramId;

mod commands;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(author, version, about = "Party finder bot CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin users
    Admins {
        #[command(subcommand)]
        action: AdminsAction,
    },
}

#[derive(Subcommand)]
enum AdminsAction {
    /// Create or promote every configured admin
    Reconcile {
        /// Extra Telegram id to treat as admin (repeatable)
        #[arg(long = "id", value_name = "TELEGRAM_ID")]
        ids: Vec<TelegramId>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admins { action } => match action {
            AdminsAction::Reconcile { ids } => commands::admins::reconcile(&ids).await?,
        },
    }
    Ok(())
}
