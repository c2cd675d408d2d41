//! Heuristic SMS classification
//!
//! Decides whether a bank SMS describes a real money movement before any
//! model call is made. The classifier is a pure function of the message and
//! the sender keyword list: same input, same verdict, no side effects.
//!
//! This module is organized as:
//! - `amount` - currency-amount candidate extraction
//! - `select` - balance filtering and candidate disambiguation
//! - the classifier itself: ordered reject checks plus direction inference

pub mod amount;
pub mod select;

pub use amount::{extract, AmountCandidate};
pub use select::{filter_balance_candidates, has_transaction_cue, is_balance_context, select};

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::RawMessage;

/// Built-in sender keyword allowlist, used when the caller supplies none
///
/// Matched case-insensitively as substrings against both the sender address
/// and the body, so "AX-ICICIB" and "your ICICI account" both pass.
pub const DEFAULT_SENDER_KEYWORDS: [&str; 16] = [
    "icici", "hdfc", "sbi", "axis", "kotak", "idfc", "pnb", "canara", "federal", "indusind",
    "citi", "paytm", "phonepe", "bank", "card", "upi",
];

/// Credit-direction vocabulary
const CREDIT_KEYWORDS: [&str; 6] = [
    "credited", "credit", "received", "deposited", "refund", "cashback",
];

/// Debit-direction vocabulary
const DEBIT_KEYWORDS: [&str; 10] = [
    "debited", "debit", "spent", "withdrawn", "paid", "payment", "purchase", "deducted",
    "charged", "sent",
];

/// Wallet top-up phrases, counted as debit-direction signals
const TOPUP_PHRASES: [&str; 4] = ["top-up", "top up", "topup", "recharge"];

/// Payment-reminder phrases (upcoming, not completed)
const REMINDER_PHRASES: [&str; 5] = [
    "due on", "due by", "to be debited", "will be debited", "will be credited",
];

/// Phrases marking a reminder-shaped message as already completed
const PROCESSED_PHRASES: [&str; 2] = ["successfully processed", "has been processed"];

fn otp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:otp|one[-\s]?time\s+password|verification\s+code|security\s+code)\b")
            .expect("valid regex")
    })
}

/// Why a message was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyBody,
    SenderNotWhitelisted,
    OtpDetected,
    PaymentReminder,
    CreditCardAck,
    NoAmount,
    MultipleAmounts,
    MissingDirectionKeywords,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyBody => "Empty SMS body",
            Self::SenderNotWhitelisted => "Sender not in whitelist",
            Self::OtpDetected => "OTP detected",
            Self::PaymentReminder => "Payment reminder detected",
            Self::CreditCardAck => "Credit card payment acknowledgement",
            Self::NoAmount => "No transaction amount found",
            Self::MultipleAmounts => "Multiple amount candidates",
            Self::MissingDirectionKeywords => "Missing debit/credit keywords",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The classifier's accept/reject decision with supporting evidence
///
/// Both variants carry the pre-lowercased sender and body so downstream
/// stages (prompt building, logging) never re-normalize.
#[derive(Debug, Clone, PartialEq)]
pub enum HeuristicVerdict {
    Rejected {
        reason: RejectReason,
        sender_norm: String,
        body_norm: String,
    },
    Approved {
        /// Always positive; direction is carried in `is_income`
        amount: f64,
        /// Defaults to "INR" when no currency token was detected
        currency: String,
        is_income: bool,
        sender_norm: String,
        body_norm: String,
    },
}

impl HeuristicVerdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }
}

/// Heuristic classifier over raw SMS messages
///
/// Construction is cheap; one instance can serve any number of messages and
/// is safe to share across threads.
#[derive(Debug, Clone)]
pub struct Classifier {
    sender_keywords: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    /// Classifier with the built-in sender keyword list
    pub fn new() -> Self {
        Self::with_sender_keywords(Vec::new())
    }

    /// Classifier with a caller-supplied sender keyword list
    ///
    /// Keywords are lowercased; an empty list falls back to the built-in one.
    pub fn with_sender_keywords(keywords: Vec<String>) -> Self {
        let sender_keywords = if keywords.is_empty() {
            DEFAULT_SENDER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect()
        } else {
            keywords.into_iter().map(|k| k.to_lowercase()).collect()
        };
        Self { sender_keywords }
    }

    /// Evaluate a message: ordered checks, first failure wins
    pub fn evaluate(&self, message: &RawMessage) -> HeuristicVerdict {
        let sender_norm = message.sender.to_lowercase();
        let body_norm = message.body.to_lowercase();

        if body_norm.trim().is_empty() {
            return rejected(RejectReason::EmptyBody, sender_norm, body_norm);
        }

        let whitelisted = self
            .sender_keywords
            .iter()
            .any(|k| sender_norm.contains(k) || body_norm.contains(k));
        if !whitelisted {
            return rejected(RejectReason::SenderNotWhitelisted, sender_norm, body_norm);
        }

        if otp_regex().is_match(&body_norm) {
            return rejected(RejectReason::OtpDetected, sender_norm, body_norm);
        }

        let reminder = REMINDER_PHRASES.iter().any(|p| body_norm.contains(p));
        let processed = PROCESSED_PHRASES.iter().any(|p| body_norm.contains(p));
        if reminder && !processed {
            return rejected(RejectReason::PaymentReminder, sender_norm, body_norm);
        }

        // Statement-payment acknowledgements are noise, not purchases
        if body_norm.contains("credit card")
            && body_norm.contains("payment")
            && body_norm.contains("received")
        {
            return rejected(RejectReason::CreditCardAck, sender_norm, body_norm);
        }

        let candidates = select::filter_balance_candidates(amount::extract(&body_norm));
        if candidates.is_empty() {
            return rejected(RejectReason::NoAmount, sender_norm, body_norm);
        }

        let winner = match select::select(&candidates) {
            Some(c) => c,
            // select() always resolves a non-empty list; the reason stays in
            // the vocabulary for verdict consumers
            None => return rejected(RejectReason::MultipleAmounts, sender_norm, body_norm),
        };

        if winner.value == 0.0 {
            return rejected(RejectReason::NoAmount, sender_norm, body_norm);
        }

        let has_credit = CREDIT_KEYWORDS.iter().any(|k| body_norm.contains(k));
        let has_debit = DEBIT_KEYWORDS.iter().any(|k| body_norm.contains(k));
        let has_topup = TOPUP_PHRASES.iter().any(|p| body_norm.contains(p));
        if !has_credit && !has_debit && !has_topup {
            return rejected(
                RejectReason::MissingDirectionKeywords,
                sender_norm,
                body_norm,
            );
        }

        let mut is_income = has_credit && !has_debit;
        if body_norm.contains("credited to beneficiary") {
            // Third-party payout confirmation, not incoming funds
            is_income = false;
        } else if has_credit && has_debit {
            is_income = body_norm.contains("credited to your")
                || (body_norm.contains("credited to a/c") && !body_norm.contains("beneficiary"));
        }

        let currency = winner.currency.clone().unwrap_or_else(|| "INR".to_string());
        debug!(
            "Approved SMS: amount={} currency={} is_income={}",
            winner.value, currency, is_income
        );

        HeuristicVerdict::Approved {
            amount: winner.value.abs(),
            currency,
            is_income,
            sender_norm,
            body_norm,
        }
    }
}

fn rejected(reason: RejectReason, sender_norm: String, body_norm: String) -> HeuristicVerdict {
    debug!("Rejected SMS: {}", reason);
    HeuristicVerdict::Rejected {
        reason,
        sender_norm,
        body_norm,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: &str, body: &str) -> RawMessage {
        RawMessage::new(sender, body)
    }

    fn reason_of(verdict: &HeuristicVerdict) -> Option<RejectReason> {
        match verdict {
            HeuristicVerdict::Rejected { reason, .. } => Some(*reason),
            HeuristicVerdict::Approved { .. } => None,
        }
    }

    #[test]
    fn test_empty_body_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "   "));
        assert_eq!(reason_of(&verdict), Some(RejectReason::EmptyBody));
    }

    #[test]
    fn test_unknown_sender_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("VM-LOANS", "Get a loan of Rs.50000 today"));
        assert_eq!(reason_of(&verdict), Some(RejectReason::SenderNotWhitelisted));
    }

    #[test]
    fn test_body_keyword_rescues_unknown_sender() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "AX-777777",
            "Rs.500 debited from your icici account for UPI payment",
        ));
        assert!(verdict.is_approved());
    }

    #[test]
    fn test_otp_rejected_even_with_amount() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "HDFCBK",
            "123456 is your OTP for a payment of Rs.999. Do not share.",
        ));
        assert_eq!(reason_of(&verdict), Some(RejectReason::OtpDetected));
    }

    #[test]
    fn test_verification_code_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("HDFCBK", "Your verification code is 4821"));
        assert_eq!(reason_of(&verdict), Some(RejectReason::OtpDetected));
    }

    #[test]
    fn test_payment_reminder_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "AXISBK",
            "Your credit card bill of Rs.4,500 is due on 12-08-2026",
        ));
        assert_eq!(reason_of(&verdict), Some(RejectReason::PaymentReminder));
    }

    #[test]
    fn test_will_be_debited_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "SBIUPI",
            "Rs.199 will be debited from your a/c for autopay",
        ));
        assert_eq!(reason_of(&verdict), Some(RejectReason::PaymentReminder));
    }

    #[test]
    fn test_processed_confirmation_is_not_a_reminder() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "SBIUPI",
            "Autopay of Rs.199 to be debited has been processed, debited from your a/c",
        ));
        assert!(verdict.is_approved());
    }

    #[test]
    fn test_credit_card_ack_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "ICICIB",
            "We have received your credit card payment of Rs.5,000",
        ));
        assert_eq!(reason_of(&verdict), Some(RejectReason::CreditCardAck));
    }

    #[test]
    fn test_no_amount_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "Your account statement is ready"));
        assert_eq!(reason_of(&verdict), Some(RejectReason::NoAmount));
    }

    #[test]
    fn test_all_amounts_in_balance_context_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "Avl bal in your a/c is INR 10,000"));
        assert_eq!(reason_of(&verdict), Some(RejectReason::NoAmount));
    }

    #[test]
    fn test_missing_direction_keywords_rejected() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "Rs.500 reference number 884210"));
        assert_eq!(
            reason_of(&verdict),
            Some(RejectReason::MissingDirectionKeywords)
        );
    }

    #[test]
    fn test_upi_debit_approved() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "Rs.500 debited from A/c for UPI payment"));
        match verdict {
            HeuristicVerdict::Approved {
                amount,
                currency,
                is_income,
                ..
            } => {
                assert_eq!(amount, 500.0);
                assert_eq!(currency, "INR");
                assert!(!is_income);
            }
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[test]
    fn test_credit_to_your_account_is_income() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("HDFCBK", "INR 2000 credited to your account"));
        match verdict {
            HeuristicVerdict::Approved {
                amount, is_income, ..
            } => {
                assert_eq!(amount, 2000.0);
                assert!(is_income);
            }
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[test]
    fn test_balance_excluded_spent_amount_wins() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "Avl bal INR 10,000. Rs.200 spent at POS"));
        match verdict {
            HeuristicVerdict::Approved {
                amount, is_income, ..
            } => {
                assert_eq!(amount, 200.0);
                assert!(!is_income);
            }
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[test]
    fn test_credited_to_beneficiary_is_not_income() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("SBIUPI", "INR 900 credited to beneficiary account"));
        match verdict {
            HeuristicVerdict::Approved { is_income, .. } => assert!(!is_income),
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[test]
    fn test_both_directions_resolved_by_specificity() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "HDFCBK",
            "Salary of INR 50,000 credited to your a/c via debit from employer",
        ));
        match verdict {
            HeuristicVerdict::Approved { is_income, .. } => assert!(is_income),
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[test]
    fn test_both_directions_with_beneficiary_is_expense() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg(
            "HDFCBK",
            "INR 1,200 debited from your a/c and credited to a/c of beneficiary",
        ));
        match verdict {
            HeuristicVerdict::Approved { is_income, .. } => assert!(!is_income),
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[test]
    fn test_currency_defaults_to_inr() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "250 spent on your card at STORE"));
        match verdict {
            HeuristicVerdict::Approved { currency, .. } => assert_eq!(currency, "INR"),
            other => panic!("expected approval, got {:?}", other),
        }
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let c = Classifier::new();
        let message = msg("ICICIB", "Rs.500 debited from A/c for UPI payment");
        assert_eq!(c.evaluate(&message), c.evaluate(&message));
    }

    #[test]
    fn test_custom_keywords_replace_defaults() {
        let c = Classifier::with_sender_keywords(vec!["MYBANK".to_string()]);
        let verdict = c.evaluate(&msg("ICICIB", "Rs.500 debited for UPI payment"));
        assert_eq!(reason_of(&verdict), Some(RejectReason::SenderNotWhitelisted));

        let verdict = c.evaluate(&msg("MYBANK", "Rs.500 debited for purchase"));
        assert!(verdict.is_approved());
    }

    #[test]
    fn test_empty_keyword_list_falls_back_to_defaults() {
        let c = Classifier::with_sender_keywords(Vec::new());
        let verdict = c.evaluate(&msg("ICICIB", "Rs.500 debited for purchase"));
        assert!(verdict.is_approved());
    }

    #[test]
    fn test_verdict_keeps_normalized_copies() {
        let c = Classifier::new();
        let verdict = c.evaluate(&msg("ICICIB", "Rs.500 Debited for Purchase"));
        match verdict {
            HeuristicVerdict::Approved {
                sender_norm,
                body_norm,
                ..
            } => {
                assert_eq!(sender_norm, "icicib");
                assert_eq!(body_norm, "rs.500 debited for purchase");
            }
            other => panic!("expected approval, got {:?}", other),
        }
    }
}
