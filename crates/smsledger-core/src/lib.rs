//! smsledger Core Library
//!
//! Shared functionality for the smsledger SMS transaction extractor:
//! - Heuristic SMS classification (sender/body filters, amount-candidate
//!   extraction and disambiguation, direction inference)
//! - Structured extraction via an OpenAI-compatible chat-completions backend
//!   with bounded retries
//! - Reconciliation of model output against the heuristic verdict, currency
//!   conversion, and duplicate suppression
//! - SQLite persistence for wallets, categories, transactions, and the
//!   app-settings blob

pub mod ai;
pub mod classify;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod retry;

/// Test utilities including the mock chat-completions server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{ExtractionBackend, MockBackend, ModelExtraction, ModelVerdict, OpenAiBackend};
pub use classify::{AmountCandidate, Classifier, HeuristicVerdict, RejectReason};
pub use config::PipelineConfig;
pub use db::{Database, TransactionInsertResult};
pub use error::{Error, Result};
pub use models::{
    Category, NewTransaction, RawMessage, ReconciledExtraction, Transaction, Wallet,
};
pub use pipeline::{
    process_message, process_message_standalone, FailureReason, Pipeline, ProcessOutcome,
    SkipReason,
};
pub use retry::RetryPolicy;
