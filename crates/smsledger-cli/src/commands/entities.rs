//! Wallet, category, and transaction commands

use anyhow::Result;
use smsledger_core::db::Database;

pub fn cmd_wallets_list(db: &Database) -> Result<()> {
    let wallets = db.list_wallets()?;
    if wallets.is_empty() {
        println!("No wallets. Add one: smsledger wallets add Main --currency INR --default");
        return Ok(());
    }

    println!("Wallets:");
    for wallet in wallets {
        println!(
            "  [{}] {} ({}){}",
            wallet.id,
            wallet.name,
            wallet.currency,
            if wallet.is_default { " *default" } else { "" }
        );
    }
    Ok(())
}

pub fn cmd_wallets_add(db: &Database, name: &str, currency: &str, default: bool) -> Result<()> {
    let id = db.insert_wallet(name, currency, default)?;
    println!("✅ Added wallet [{}] {}", id, name);
    Ok(())
}

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;
    if categories.is_empty() {
        println!("No categories. Add one: smsledger categories add Food");
        return Ok(());
    }

    println!("Categories:");
    for category in categories {
        println!("  [{}] {}", category.id, category.name);
    }
    Ok(())
}

pub fn cmd_categories_add(db: &Database, name: &str) -> Result<()> {
    let id = db.insert_category(name)?;
    println!("✅ Added category [{}] {}", id, name);
    Ok(())
}

pub fn cmd_transactions_list(db: &Database, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(limit)?;
    if transactions.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!("Transactions (newest first):");
    for tx in transactions {
        println!(
            "  [{}] {} {:>12.2}  {}  {}",
            tx.id,
            tx.date.format("%Y-%m-%d"),
            tx.amount,
            if tx.is_income { "in " } else { "out" },
            tx.name
        );
    }
    Ok(())
}
