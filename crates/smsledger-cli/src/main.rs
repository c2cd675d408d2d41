//! smsledger CLI - Bank SMS transaction extractor
//!
//! Usage:
//!   smsledger init                          Initialize database
//!   smsledger settings set openaiApiKey K   Configure the extraction service
//!   smsledger process --sender S --body B   Run the full pipeline on one SMS
//!   smsledger classify --sender S --body B  Heuristic verdict only (offline)
//!   smsledger transactions                  List extracted transactions

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Process { sender, body } => commands::cmd_process(&cli.db, &sender, &body).await,
        Commands::Classify { sender, body } => commands::cmd_classify(&cli.db, &sender, &body),
        Commands::Wallets { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(WalletsAction::List) => commands::cmd_wallets_list(&db),
                Some(WalletsAction::Add {
                    name,
                    currency,
                    default,
                }) => commands::cmd_wallets_add(&db, &name, &currency, default),
            }
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Add { name }) => commands::cmd_categories_add(&db, &name),
            }
        }
        Commands::Transactions { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, limit)
        }
        Commands::Settings { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None | Some(SettingsAction::List) => commands::cmd_settings_list(&db),
                Some(SettingsAction::Get { key }) => commands::cmd_settings_get(&db, &key),
                Some(SettingsAction::Set { key, value }) => {
                    commands::cmd_settings_set(&db, &key, &value)
                }
            }
        }
        Commands::Status => commands::cmd_status(&cli.db),
    }
}
