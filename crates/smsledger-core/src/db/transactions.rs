//! Transaction operations

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

/// Tolerance for matching REAL amounts in the duplicate query
const AMOUNT_EPSILON: f64 = 0.005;

/// Result of inserting a transaction
#[derive(Debug, Clone)]
pub enum TransactionInsertResult {
    /// Transaction was inserted successfully, contains new transaction ID
    Inserted(i64),
    /// Transaction was a duplicate, contains existing transaction ID
    Duplicate(i64),
}

fn map_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        name: row.get(1)?,
        amount: row.get(2)?,
        note: row.get(3)?,
        category_id: row.get(4)?,
        wallet_id: row.get(5)?,
        date: parse_datetime(&row.get::<_, String>(6)?),
        paid: row.get::<_, i64>(7)? != 0,
        is_income: row.get::<_, i64>(8)? != 0,
    })
}

const TRANSACTION_COLUMNS: &str =
    "id, name, amount, note, category_id, wallet_id, date, paid, is_income";

impl Database {
    /// Insert a transaction unconditionally
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (name, amount, note, category_id, wallet_id, date, paid, is_income)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.name,
                tx.amount,
                tx.note,
                tx.category_id,
                tx.wallet_id,
                format_datetime(tx.date),
                tx.paid as i64,
                tx.is_income() as i64,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Find a recent record with the same amount and note
    ///
    /// Matches rows created at or after `since`; amounts compare within a
    /// small epsilon because they are stored as REAL.
    pub fn find_recent_duplicate(
        &self,
        amount: f64,
        note: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let existing: Option<i64> = conn
            .query_row(
                r#"
                SELECT id FROM transactions
                WHERE ABS(amount - ?) < ? AND note = ? AND created_at >= ?
                ORDER BY id DESC LIMIT 1
                "#,
                params![amount, AMOUNT_EPSILON, note, format_datetime(since)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(existing)
    }

    /// Insert unless an identical record exists inside the dedup window
    pub fn insert_transaction_deduped(
        &self,
        tx: &NewTransaction,
        window: Duration,
    ) -> Result<TransactionInsertResult> {
        let since = Utc::now() - window;
        if let Some(existing_id) = self.find_recent_duplicate(tx.amount, &tx.note, since)? {
            return Ok(TransactionInsertResult::Duplicate(existing_id));
        }

        let id = self.insert_transaction(tx)?;
        Ok(TransactionInsertResult::Inserted(id))
    }

    /// List transactions, newest first
    pub fn list_transactions(&self, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY id DESC LIMIT ?",
            TRANSACTION_COLUMNS
        ))?;
        let transactions = stmt
            .query_map(params![limit], map_transaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(transactions)
    }

    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
                params![id],
                map_transaction,
            )
            .optional()?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn sample_tx(db: &Database, amount: f64, note: &str) -> NewTransaction {
        let wallet_id = db.insert_wallet("Main", "INR", true).unwrap();
        let category_id = db.insert_category("Misc").unwrap();
        NewTransaction {
            name: "Test".to_string(),
            amount,
            note: note.to_string(),
            category_id,
            wallet_id,
            date: Utc::now(),
            paid: true,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::in_memory().unwrap();
        let tx = sample_tx(&db, -250.0, "Rs.250 spent at POS");
        let id = db.insert_transaction(&tx).unwrap();

        let stored = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(stored.name, "Test");
        assert_eq!(stored.amount, -250.0);
        assert_eq!(stored.note, "Rs.250 spent at POS");
        assert!(stored.paid);
        assert!(!stored.is_income);
    }

    #[test]
    fn test_income_flag_follows_sign() {
        let db = Database::in_memory().unwrap();
        let tx = sample_tx(&db, 2000.0, "INR 2000 credited to your account");
        let id = db.insert_transaction(&tx).unwrap();
        assert!(db.get_transaction(id).unwrap().unwrap().is_income);
    }

    #[test]
    fn test_dedup_skips_identical_recent_insert() {
        let db = Database::in_memory().unwrap();
        let tx = sample_tx(&db, -500.0, "Rs.500 debited from A/c for UPI payment");

        let first = db
            .insert_transaction_deduped(&tx, Duration::minutes(5))
            .unwrap();
        let first_id = match first {
            TransactionInsertResult::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        };

        let second = db
            .insert_transaction_deduped(&tx, Duration::minutes(5))
            .unwrap();
        match second {
            TransactionInsertResult::Duplicate(id) => assert_eq!(id, first_id),
            other => panic!("expected duplicate, got {:?}", other),
        }

        assert_eq!(db.list_transactions(10).unwrap().len(), 1);
    }

    #[test]
    fn test_different_note_is_not_a_duplicate() {
        let db = Database::in_memory().unwrap();
        let tx = sample_tx(&db, -500.0, "Rs.500 debited for UPI");
        db.insert_transaction_deduped(&tx, Duration::minutes(5))
            .unwrap();

        let other = NewTransaction {
            note: "Rs.500 debited at POS".to_string(),
            ..tx
        };
        match db
            .insert_transaction_deduped(&other, Duration::minutes(5))
            .unwrap()
        {
            TransactionInsertResult::Inserted(_) => {}
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn test_different_amount_is_not_a_duplicate() {
        let db = Database::in_memory().unwrap();
        let tx = sample_tx(&db, -500.0, "same note");
        db.insert_transaction_deduped(&tx, Duration::minutes(5))
            .unwrap();

        let other = NewTransaction {
            amount: -501.0,
            ..tx
        };
        match db
            .insert_transaction_deduped(&other, Duration::minutes(5))
            .unwrap()
        {
            TransactionInsertResult::Inserted(_) => {}
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn test_record_outside_window_is_not_a_duplicate() {
        let db = Database::in_memory().unwrap();
        let tx = sample_tx(&db, -500.0, "same note");
        db.insert_transaction(&tx).unwrap();

        // A lookback that starts in the future cannot see the record
        let since = Utc::now() + Duration::seconds(60);
        assert!(db
            .find_recent_duplicate(-500.0, "same note", since)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let db = Database::in_memory().unwrap();
        let tx = sample_tx(&db, -100.0, "first");
        db.insert_transaction(&tx).unwrap();
        let second = NewTransaction {
            note: "second".to_string(),
            ..tx
        };
        db.insert_transaction(&second).unwrap();

        let listed = db.list_transactions(10).unwrap();
        assert_eq!(listed[0].note, "second");
        assert_eq!(listed[1].note, "first");
    }
}
