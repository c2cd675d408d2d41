//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// smsledger - Turn bank SMS notifications into ledger transactions
#[derive(Parser)]
#[command(name = "smsledger")]
#[command(about = "Classify bank SMS messages and extract transactions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "smsledger.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database with a default wallet and starter categories
    Init,

    /// Run the full pipeline on one SMS message (needs an API key configured)
    Process {
        /// SMS sender address
        #[arg(short, long)]
        sender: String,

        /// SMS body text
        #[arg(short, long)]
        body: String,
    },

    /// Run only the heuristic classifier on one SMS message (offline)
    Classify {
        /// SMS sender address
        #[arg(short, long)]
        sender: String,

        /// SMS body text
        #[arg(short, long)]
        body: String,
    },

    /// Manage wallets
    Wallets {
        #[command(subcommand)]
        action: Option<WalletsAction>,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// List extracted transactions
    Transactions {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Manage app settings (API key, model, sender keywords, ...)
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Show database status
    Status,
}

#[derive(Subcommand)]
pub enum WalletsAction {
    /// List wallets
    List,

    /// Add a wallet
    Add {
        /// Wallet name
        name: String,

        /// ISO currency code
        #[arg(short, long, default_value = "INR")]
        currency: String,

        /// Make this the default wallet
        #[arg(long)]
        default: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories
    List,

    /// Add a category
    Add {
        /// Category name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// List all settings (API key redacted)
    List,

    /// Show one setting
    Get {
        /// Settings key, e.g. openaiApiKey
        key: String,
    },

    /// Set one setting (value parsed as JSON, else stored as a string)
    Set {
        /// Settings key, e.g. openaiApiKey
        key: String,

        /// Value
        value: String,
    },
}
