//! Domain models for smsledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw SMS message as handed over by the delivery collaborator
///
/// `sender` is the SMS address field, `body` the message text. The struct is
/// read-only to the core; normalized copies are produced during
/// classification and carried in the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    pub sender: String,
    pub body: String,
}

impl RawMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }
}

/// A wallet that transactions are booked against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub name: String,
    /// ISO currency code, e.g. "INR"
    pub currency: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// A spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Short human-readable title produced by the extraction model
    pub name: String,
    /// Signed amount: positive for income, negative for expense
    pub amount: f64,
    /// The original SMS body, kept verbatim for audit and dedup
    pub note: String,
    pub category_id: i64,
    pub wallet_id: i64,
    pub date: DateTime<Utc>,
    pub paid: bool,
    pub is_income: bool,
}

/// A transaction ready to be inserted
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub name: String,
    pub amount: f64,
    pub note: String,
    pub category_id: i64,
    pub wallet_id: i64,
    pub date: DateTime<Utc>,
    pub paid: bool,
}

impl NewTransaction {
    /// Direction flag derived from the amount sign
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

/// Result of merging the model's output with the heuristic verdict
///
/// The amount sign is forced to match the heuristic's inferred direction;
/// the model only contributes magnitude, title, category, and date.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledExtraction {
    pub title: String,
    pub amount: f64,
    pub currency: String,
    pub category_name: Option<String>,
    pub date: DateTime<Utc>,
}
