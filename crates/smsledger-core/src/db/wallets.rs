//! Wallet operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::Wallet;

fn map_wallet(row: &Row<'_>) -> rusqlite::Result<Wallet> {
    Ok(Wallet {
        id: row.get(0)?,
        name: row.get(1)?,
        currency: row.get(2)?,
        is_default: row.get::<_, i64>(3)? != 0,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

const WALLET_COLUMNS: &str = "id, name, currency, is_default, created_at";

impl Database {
    pub fn insert_wallet(&self, name: &str, currency: &str, is_default: bool) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO wallets (name, currency, is_default) VALUES (?, ?, ?)",
            params![name, currency.to_uppercase(), is_default as i64],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_wallet(&self, id: i64) -> Result<Option<Wallet>> {
        let conn = self.conn()?;
        let wallet = conn
            .query_row(
                &format!("SELECT {} FROM wallets WHERE id = ?", WALLET_COLUMNS),
                params![id],
                map_wallet,
            )
            .optional()?;
        Ok(wallet)
    }

    /// The wallet flagged as default, lowest id winning if several are
    pub fn default_wallet(&self) -> Result<Option<Wallet>> {
        let conn = self.conn()?;
        let wallet = conn
            .query_row(
                &format!(
                    "SELECT {} FROM wallets WHERE is_default = 1 ORDER BY id LIMIT 1",
                    WALLET_COLUMNS
                ),
                [],
                map_wallet,
            )
            .optional()?;
        Ok(wallet)
    }

    /// Any wallet at all, used as the last fallback
    pub fn first_wallet(&self) -> Result<Option<Wallet>> {
        let conn = self.conn()?;
        let wallet = conn
            .query_row(
                &format!("SELECT {} FROM wallets ORDER BY id LIMIT 1", WALLET_COLUMNS),
                [],
                map_wallet,
            )
            .optional()?;
        Ok(wallet)
    }

    pub fn list_wallets(&self) -> Result<Vec<Wallet>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM wallets ORDER BY id", WALLET_COLUMNS))?;
        let wallets = stmt
            .query_map([], map_wallet)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(wallets)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn test_insert_and_get_wallet() {
        let db = Database::in_memory().unwrap();
        let id = db.insert_wallet("Cash", "inr", false).unwrap();
        let wallet = db.get_wallet(id).unwrap().unwrap();
        assert_eq!(wallet.name, "Cash");
        assert_eq!(wallet.currency, "INR");
        assert!(!wallet.is_default);
    }

    #[test]
    fn test_get_missing_wallet_is_none() {
        let db = Database::in_memory().unwrap();
        assert!(db.get_wallet(99).unwrap().is_none());
    }

    #[test]
    fn test_default_wallet_fallback_chain() {
        let db = Database::in_memory().unwrap();
        assert!(db.default_wallet().unwrap().is_none());
        assert!(db.first_wallet().unwrap().is_none());

        let first = db.insert_wallet("Cash", "INR", false).unwrap();
        let main = db.insert_wallet("Main", "INR", true).unwrap();

        assert_eq!(db.default_wallet().unwrap().unwrap().id, main);
        assert_eq!(db.first_wallet().unwrap().unwrap().id, first);
    }

    #[test]
    fn test_list_wallets() {
        let db = Database::in_memory().unwrap();
        db.insert_wallet("A", "INR", false).unwrap();
        db.insert_wallet("B", "USD", false).unwrap();
        assert_eq!(db.list_wallets().unwrap().len(), 2);
    }
}
