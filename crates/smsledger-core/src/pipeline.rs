//! Extraction pipeline
//!
//! Takes an accepted SMS all the way to a persisted transaction: heuristic
//! classification, wallet resolution, prompt construction, the model call,
//! reconciliation of the model's output against the heuristic evidence,
//! currency conversion, duplicate suppression, insert.
//!
//! Every expected terminal state is a [`ProcessOutcome`] value; `Err` is
//! reserved for infrastructure faults (database access, fatal
//! configuration). Nothing here panics or raises past the caller, so the
//! delivery collaborator stays functional whatever happens to one message.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::ai::{parse_content, ExtractionBackend, ModelExtraction, ModelVerdict, OpenAiBackend};
use crate::classify::{Classifier, HeuristicVerdict, RejectReason};
use crate::config::PipelineConfig;
use crate::currency;
use crate::db::{Database, TransactionInsertResult};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, RawMessage, ReconciledExtraction, Wallet};

/// Lookback for duplicate suppression
pub const DEDUP_WINDOW_MINUTES: i64 = 5;

/// Why a message was skipped before any model call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingApiKey,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "No API key configured"),
        }
    }
}

/// Why processing failed after the heuristic accepted the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Retries exhausted or a permanent transport/API error
    CallFailed(String),
    /// The model's content was not a valid extraction object
    InvalidModelOutput(String),
    /// Neither the model nor the heuristic produced an amount
    MissingAmount,
    /// The model produced no usable title
    MissingTitle,
    /// The reconciled magnitude was zero
    ZeroAmount,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallFailed(why) => write!(f, "Model call failed: {}", why),
            Self::InvalidModelOutput(why) => write!(f, "Invalid model output: {}", why),
            Self::MissingAmount => write!(f, "No amount in model output or heuristic"),
            Self::MissingTitle => write!(f, "Missing or blank title"),
            Self::ZeroAmount => write!(f, "Reconciled amount is zero"),
        }
    }
}

/// Terminal state of one message's trip through the pipeline
#[derive(Debug)]
pub enum ProcessOutcome {
    /// A transaction was persisted
    Inserted(i64),
    /// An identical recent transaction already exists; success-no-op
    Duplicate(i64),
    /// The heuristic classifier rejected the message
    Rejected(RejectReason),
    /// The model judged the message not to be a transaction
    NotATransaction,
    /// Processing never started (configuration)
    Skipped(SkipReason),
    /// Processing started but could not complete
    Failed(FailureReason),
}

impl fmt::Display for ProcessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted(id) => write!(f, "inserted transaction {}", id),
            Self::Duplicate(id) => write!(f, "duplicate of transaction {}", id),
            Self::Rejected(reason) => write!(f, "rejected: {}", reason),
            Self::NotATransaction => write!(f, "model says not a transaction"),
            Self::Skipped(reason) => write!(f, "skipped: {}", reason),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// The wallet a transaction will be booked against
///
/// Lookup falls back from the configured id to the default wallet to any
/// wallet; when none exist the configured id is carried through untouched
/// and the persistence layer has the final word.
#[derive(Debug)]
enum WalletRef {
    Existing(Wallet),
    Configured(i64),
}

impl WalletRef {
    fn id(&self) -> i64 {
        match self {
            Self::Existing(w) => w.id,
            Self::Configured(id) => *id,
        }
    }

    fn currency(&self) -> Option<&str> {
        match self {
            Self::Existing(w) => Some(&w.currency),
            Self::Configured(_) => None,
        }
    }
}

/// Extraction pipeline over one database handle and one backend
pub struct Pipeline<'a> {
    db: &'a Database,
    config: PipelineConfig,
    backend: &'a dyn ExtractionBackend,
    classifier: Classifier,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        db: &'a Database,
        config: PipelineConfig,
        backend: &'a dyn ExtractionBackend,
    ) -> Self {
        let classifier = Classifier::with_sender_keywords(config.sender_keywords.clone());
        Self {
            db,
            config,
            backend,
            classifier,
        }
    }

    /// Process one message end to end
    pub async fn process(&self, message: &RawMessage) -> Result<ProcessOutcome> {
        let verdict = self.classifier.evaluate(message);
        let (amount, currency_code, is_income, sender_norm) = match verdict {
            HeuristicVerdict::Rejected { reason, .. } => {
                debug!("SMS from {} rejected: {}", message.sender, reason);
                return Ok(ProcessOutcome::Rejected(reason));
            }
            HeuristicVerdict::Approved {
                amount,
                currency,
                is_income,
                sender_norm,
                ..
            } => (amount, currency, is_income, sender_norm),
        };

        let wallet = self.resolve_wallet()?;

        let user_message =
            build_user_message(message, amount, &currency_code, is_income, &sender_norm);
        let content = match self
            .backend
            .extract(&self.config.prompt_template, &user_message)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!("Extraction call failed: {}", e);
                return Ok(ProcessOutcome::Failed(FailureReason::CallFailed(
                    e.to_string(),
                )));
            }
        };

        let extraction = match parse_content(&content) {
            Ok(ModelVerdict::NotATransaction) => {
                debug!("Model classified SMS from {} as non-transaction", message.sender);
                return Ok(ProcessOutcome::NotATransaction);
            }
            Ok(ModelVerdict::Extraction(extraction)) => extraction,
            Err(e) => {
                warn!("Unusable model output: {}", e);
                return Ok(ProcessOutcome::Failed(FailureReason::InvalidModelOutput(
                    e.to_string(),
                )));
            }
        };

        let heuristic_signed = if is_income { amount } else { -amount };
        let reconciled =
            match reconcile(&extraction, heuristic_signed, is_income, &currency_code) {
                Ok(reconciled) => reconciled,
                Err(reason) => {
                    warn!("Reconciliation failed: {}", reason);
                    return Ok(ProcessOutcome::Failed(reason));
                }
            };

        let amount_booked = self.convert_for_wallet(&reconciled, &wallet);
        let category_id = self.resolve_category(reconciled.category_name.as_deref())?;

        let tx = NewTransaction {
            name: reconciled.title,
            amount: amount_booked,
            note: message.body.clone(),
            category_id,
            wallet_id: wallet.id(),
            date: reconciled.date,
            paid: true,
        };

        match self
            .db
            .insert_transaction_deduped(&tx, Duration::minutes(DEDUP_WINDOW_MINUTES))?
        {
            TransactionInsertResult::Duplicate(id) => {
                info!(
                    "Skipping duplicate of transaction {} ({} within {} min)",
                    id, tx.amount, DEDUP_WINDOW_MINUTES
                );
                Ok(ProcessOutcome::Duplicate(id))
            }
            TransactionInsertResult::Inserted(id) => {
                info!("Inserted transaction {}: {} {}", id, tx.name, tx.amount);
                Ok(ProcessOutcome::Inserted(id))
            }
        }
    }

    /// Configured wallet, else the default, else any, else the bare id
    fn resolve_wallet(&self) -> Result<WalletRef> {
        if let Some(pk) = self.config.wallet_pk {
            if let Some(wallet) = self.db.get_wallet(pk)? {
                return Ok(WalletRef::Existing(wallet));
            }
            debug!("Configured wallet {} not found, falling back", pk);
        }
        if let Some(wallet) = self.db.default_wallet()? {
            return Ok(WalletRef::Existing(wallet));
        }
        if let Some(wallet) = self.db.first_wallet()? {
            return Ok(WalletRef::Existing(wallet));
        }
        Ok(WalletRef::Configured(self.config.wallet_pk.unwrap_or(0)))
    }

    /// Convert the reconciled amount into the wallet's currency
    ///
    /// Best-effort: without a resolvable rate (or a known wallet currency)
    /// the amount passes through unconverted.
    fn convert_for_wallet(&self, reconciled: &ReconciledExtraction, wallet: &WalletRef) -> f64 {
        let Some(wallet_currency) = wallet.currency() else {
            return reconciled.amount;
        };
        if wallet_currency.eq_ignore_ascii_case(&reconciled.currency) {
            return reconciled.amount;
        }

        match currency::convert(
            reconciled.amount,
            &reconciled.currency,
            wallet_currency,
            &self.config.custom_rates,
            &self.config.cached_rates,
        ) {
            Some(converted) => converted,
            None => {
                warn!(
                    "No exchange rate for {} -> {}, keeping amount unconverted",
                    reconciled.currency, wallet_currency
                );
                reconciled.amount
            }
        }
    }

    /// Category by case-insensitive name, falling back to the first one
    ///
    /// An empty category table is a configuration fault, not a skippable
    /// condition.
    fn resolve_category(&self, name: Option<&str>) -> Result<i64> {
        if let Some(name) = name {
            if let Some(category) = self.db.find_category_by_name(name)? {
                return Ok(category.id);
            }
            debug!("No category named '{}', using fallback", name);
        }

        let categories = self.db.list_categories()?;
        let first = categories.first().ok_or_else(|| {
            Error::Config("No categories exist; cannot book transactions".into())
        })?;
        Ok(first.id)
    }
}

/// Process one message using settings stored in the database
///
/// The foreground entry point: the caller owns the handle and can reuse it
/// across messages.
pub async fn process_message(db: &Database, message: &RawMessage) -> Result<ProcessOutcome> {
    let settings = db.get_settings()?;
    let config = PipelineConfig::from_settings(&settings);

    let Some(backend) = OpenAiBackend::from_config(&config) else {
        warn!("Skipping SMS from {}: no API key configured", message.sender);
        return Ok(ProcessOutcome::Skipped(SkipReason::MissingApiKey));
    };

    Pipeline::new(db, config, &backend).process(message).await
}

/// Cold-start entry point: open a database handle, process one message,
/// close the handle
pub async fn process_message_standalone(
    db_path: &str,
    message: &RawMessage,
) -> Result<ProcessOutcome> {
    let db = Database::open(db_path)?;
    process_message(&db, message).await
    // pool drops here, closing the handle
}

/// Merge the model's extraction with the heuristic evidence
///
/// The model supplies title/category/date and preferably the magnitude; the
/// heuristic's direction always dictates the sign, and its amount is the
/// fallback magnitude.
fn reconcile(
    extraction: &ModelExtraction,
    heuristic_signed: f64,
    is_income: bool,
    currency: &str,
) -> std::result::Result<ReconciledExtraction, FailureReason> {
    let title = extraction.title.as_deref().map(str::trim).unwrap_or("");
    if title.is_empty() {
        return Err(FailureReason::MissingTitle);
    }

    let magnitude = match extraction.amount_value() {
        Some(v) => v.abs(),
        None if heuristic_signed != 0.0 => heuristic_signed.abs(),
        None => return Err(FailureReason::MissingAmount),
    };
    if magnitude == 0.0 {
        return Err(FailureReason::ZeroAmount);
    }

    let amount = if is_income { magnitude } else { -magnitude };

    let date = extraction
        .date
        .as_deref()
        .and_then(parse_model_date)
        .unwrap_or_else(Utc::now);

    Ok(ReconciledExtraction {
        title: title.to_string(),
        amount,
        currency: currency.to_string(),
        category_name: extraction.category.clone(),
        date,
    })
}

/// Accept RFC 3339 or plain YYYY-MM-DD from the model
fn parse_model_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// User message: the raw SMS body plus a structured context object derived
/// from the heuristic verdict
fn build_user_message(
    message: &RawMessage,
    amount: f64,
    currency: &str,
    is_income: bool,
    sender_norm: &str,
) -> String {
    let signed = if is_income { amount } else { -amount };
    let context = json!({
        "sender": message.sender,
        "normalizedSender": sender_norm,
        "detectedAmount": amount,
        "suggestedSignedAmount": signed,
        "currency": currency,
        "direction": if is_income { "income" } else { "expense" },
    });

    format!("SMS: {}\nContext: {}", message.body, context)
}
