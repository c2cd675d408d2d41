//! Amount-candidate extraction
//!
//! Scans free SMS text for currency-amount tokens. Every match becomes an
//! [`AmountCandidate`] carrying the parsed value, the normalized currency (if
//! one was attached to the number), the match position, and a context window
//! used later for balance/transaction-cue checks. The window spans up to 20
//! characters on each side of the match but never crosses a clause boundary,
//! so a balance figure in one clause does not leak into the context of an
//! amount in the next.

use std::sync::OnceLock;

use regex::Regex;

/// Letter-coded currency tokens recognized next to an amount
const CURRENCY_CODES: [&str; 13] = [
    "INR", "USD", "EUR", "GBP", "AED", "SAR", "QAR", "SGD", "AUD", "CAD", "JPY", "MYR", "RS",
];

/// Characters of context captured on each side of a match
const CONTEXT_CHARS: usize = 20;

/// Clause delimiters that terminate a context window
const CLAUSE_DELIMITERS: [char; 4] = ['.', '!', ';', '\n'];

/// One currency-amount match inside a message body
///
/// Transient: produced fresh on every extraction call and discarded once the
/// classifier has picked a winner.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountCandidate {
    /// Parsed numeric value with grouping separators stripped
    pub value: f64,
    /// Normalized currency code, `None` when no recognizable token was attached
    pub currency: Option<String>,
    /// Up to 20 characters of surrounding text per side, clause-bounded
    pub context: String,
    /// Byte offset of the match start, used for earliest-wins ordering
    pub position: usize,
}

fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Optional leading currency token (symbol or word code, optional dot as
        // in "Rs."), a numeric group with sign/grouping/decimals, and an
        // optional trailing currency token. Word codes require a boundary so
        // "hrs" does not read as "rs".
        let word = "rs|inr|usd|eur|gbp|aed|sar|qar|sgd|aud|cad|jpy|myr";
        let pattern = format!(
            r"(?i)(?:(₹|\b(?:{word}))\.?\s*)?([+-]?\d+(?:,\d{{2,3}})*(?:\.\d+)?)(?:\s*(₹|(?:{word})\b))?",
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

/// Extract all amount candidates from a message body
///
/// The returned list is fresh per call and ordered by position. Matches whose
/// numeric group fails to parse are discarded.
pub fn extract(body: &str) -> Vec<AmountCandidate> {
    let mut candidates = Vec::new();

    for caps in amount_regex().captures_iter(body) {
        let m = caps.get(0).expect("capture 0 always present");
        let numeric = match caps.get(2) {
            Some(g) => g.as_str(),
            None => continue,
        };

        let cleaned: String = numeric
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();
        let value: f64 = match cleaned.parse() {
            Ok(v) => v,
            Err(_) => continue,
        };

        let currency = caps
            .get(1)
            .and_then(|g| normalize_currency(g.as_str()))
            .or_else(|| caps.get(3).and_then(|g| normalize_currency(g.as_str())));

        candidates.push(AmountCandidate {
            value,
            currency,
            context: context_window(body, m.start(), m.end()),
            position: m.start(),
        });
    }

    candidates
}

/// Normalize a matched currency token to an ISO-style code
///
/// The rupee symbol resolves to INR directly; everything else is stripped to
/// letters, uppercased, and checked against the known code set ("RS" maps to
/// INR). Unrecognized tokens yield `None` and are defaulted later.
pub fn normalize_currency(token: &str) -> Option<String> {
    if token.contains('₹') {
        return Some("INR".to_string());
    }

    let letters: String = token
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase();

    if letters.is_empty() || !CURRENCY_CODES.contains(&letters.as_str()) {
        return None;
    }

    if letters == "RS" {
        Some("INR".to_string())
    } else {
        Some(letters)
    }
}

/// Context window around a match: up to [`CONTEXT_CHARS`] per side, clipped
/// to char boundaries and stopping at clause delimiters outside the match
fn context_window(body: &str, start: usize, end: usize) -> String {
    let mut prefix_rev = Vec::new();
    for c in body[..start].chars().rev() {
        if CLAUSE_DELIMITERS.contains(&c) || prefix_rev.len() == CONTEXT_CHARS {
            break;
        }
        prefix_rev.push(c);
    }
    let prefix: String = prefix_rev.into_iter().rev().collect();

    let mut suffix = String::new();
    let mut taken = 0;
    for c in body[end..].chars() {
        if CLAUSE_DELIMITERS.contains(&c) || taken == CONTEXT_CHARS {
            break;
        }
        suffix.push(c);
        taken += 1;
    }

    format!("{}{}{}", prefix, &body[start..end], suffix)
}
