//! Pipeline commands
//!
//! `process` plays the role of the SMS delivery collaborator's cold-start
//! callback: it opens its own database handle, runs one message through the
//! full pipeline, and closes the handle. `classify` runs only the offline
//! heuristic and prints the verdict.

use std::path::Path;

use anyhow::{Context, Result};
use smsledger_core::{
    process_message_standalone, Classifier, HeuristicVerdict, PipelineConfig, ProcessOutcome,
    RawMessage,
};

use super::open_db;

pub async fn cmd_process(db_path: &Path, sender: &str, body: &str) -> Result<()> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    let message = RawMessage::new(sender, body);

    let outcome = process_message_standalone(path_str, &message)
        .await
        .context("Pipeline failed")?;

    match &outcome {
        ProcessOutcome::Inserted(id) => println!("✅ Inserted transaction {}", id),
        ProcessOutcome::Duplicate(id) => {
            println!("⏭️  Duplicate of transaction {} (skipped)", id)
        }
        ProcessOutcome::Rejected(reason) => println!("🚫 Rejected: {}", reason),
        ProcessOutcome::NotATransaction => println!("🚫 Model says: not a transaction"),
        ProcessOutcome::Skipped(reason) => println!("⏭️  Skipped: {}", reason),
        ProcessOutcome::Failed(reason) => println!("⚠️  Failed: {}", reason),
    }

    Ok(())
}

pub fn cmd_classify(db_path: &Path, sender: &str, body: &str) -> Result<()> {
    // Use configured sender keywords when the database has them
    let db = open_db(db_path)?;
    let config = PipelineConfig::from_settings(&db.get_settings()?);
    let classifier = Classifier::with_sender_keywords(config.sender_keywords);

    let message = RawMessage::new(sender, body);
    match classifier.evaluate(&message) {
        HeuristicVerdict::Rejected { reason, .. } => {
            println!("🚫 Rejected: {}", reason);
        }
        HeuristicVerdict::Approved {
            amount,
            currency,
            is_income,
            ..
        } => {
            println!("✅ Approved");
            println!("   Amount:    {} {}", amount, currency);
            println!(
                "   Direction: {}",
                if is_income { "income" } else { "expense" }
            );
        }
    }

    Ok(())
}
