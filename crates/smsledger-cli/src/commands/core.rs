//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database with starter data
//! - `cmd_status` - Show database status

use std::path::Path;

use anyhow::{Context, Result};
use smsledger_core::db::Database;

/// Categories seeded by `init` so the pipeline always has a fallback
const STARTER_CATEGORIES: [&str; 6] = ["Food", "Shopping", "Travel", "Bills", "Salary", "Other"];

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::open(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;

    if db.list_wallets()?.is_empty() {
        db.insert_wallet("Main", "INR", true)
            .context("Failed to create default wallet")?;
        println!("   Created default wallet 'Main' (INR)");
    }

    if db.list_categories()?.is_empty() {
        for name in STARTER_CATEGORIES {
            db.insert_category(name)
                .context("Failed to seed categories")?;
        }
        println!("   Seeded {} starter categories", STARTER_CATEGORIES.len());
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Configure the extractor: smsledger settings set openaiApiKey sk-...");
    println!("  2. Process a message: smsledger process --sender ICICIB --body \"Rs.500 debited...\"");

    Ok(())
}

pub fn cmd_status(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;

    let wallets = db.list_wallets()?;
    let categories = db.list_categories()?;
    let transactions = db.list_transactions(i64::MAX)?;
    let settings = db.get_settings()?;
    let has_api_key = settings
        .get("openaiApiKey")
        .and_then(|v| v.as_str())
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false);

    println!("📊 smsledger status ({})", db.path());
    println!("   Wallets:      {}", wallets.len());
    println!("   Categories:   {}", categories.len());
    println!("   Transactions: {}", transactions.len());
    println!(
        "   API key:      {}",
        if has_api_key { "configured" } else { "not set" }
    );

    if !has_api_key {
        println!();
        println!("💡 Set an API key to enable extraction:");
        println!("   smsledger settings set openaiApiKey sk-...");
    }

    Ok(())
}
