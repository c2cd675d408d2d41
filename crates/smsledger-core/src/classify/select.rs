//! Candidate disambiguation
//!
//! Picks exactly one amount candidate out of many. Balance figures are not
//! merely deprioritized: a candidate whose context marks it as an account
//! balance or limit is removed outright before disambiguation. Among the
//! survivors, candidates near transaction vocabulary win, with the earliest
//! occurrence breaking ties.

use super::amount::AmountCandidate;

/// Context keywords marking a number as a balance/limit, not a transaction
const BALANCE_KEYWORDS: [&str; 5] = ["balance", "bal", "avl", "available limit", "closing balance"];

/// Context keywords tying a number to a purchase/transfer action
const TRANSACTION_CUES: [&str; 10] = [
    "debit", "credit", "pos", "card", "upi", "transfer", "spent", "payment", "purchase", "at ",
];

/// Whether a candidate's context window marks it as a balance figure
pub fn is_balance_context(candidate: &AmountCandidate) -> bool {
    let context = candidate.context.to_lowercase();
    BALANCE_KEYWORDS.iter().any(|k| context.contains(k))
}

/// Whether a candidate's context window contains a transaction cue
pub fn has_transaction_cue(candidate: &AmountCandidate) -> bool {
    let context = candidate.context.to_lowercase();
    TRANSACTION_CUES.iter().any(|k| context.contains(k))
}

/// Drop all candidates sitting in balance context
pub fn filter_balance_candidates(candidates: Vec<AmountCandidate>) -> Vec<AmountCandidate> {
    candidates
        .into_iter()
        .filter(|c| !is_balance_context(c))
        .collect()
}

/// Select one candidate from an already balance-filtered list
///
/// None or one candidate: returned as-is. Multiple: candidates with a
/// transaction cue are preferred; within the preferred subset (or all
/// candidates when none carry a cue) the earliest occurrence wins. A
/// non-empty list therefore always resolves to a single candidate; only an
/// empty list yields `None`.
pub fn select(candidates: &[AmountCandidate]) -> Option<AmountCandidate> {
    match candidates {
        [] => None,
        [only] => Some(only.clone()),
        _ => {
            let cued: Vec<&AmountCandidate> = candidates
                .iter()
                .filter(|c| has_transaction_cue(c))
                .collect();
            let pool: Vec<&AmountCandidate> = if cued.is_empty() {
                candidates.iter().collect()
            } else {
                cued
            };
            pool.into_iter().min_by_key(|c| c.position).cloned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::amount::extract;

    fn candidate(value: f64, context: &str, position: usize) -> AmountCandidate {
        AmountCandidate {
            value,
            currency: None,
            context: context.to_string(),
            position,
        }
    }

    #[test]
    fn test_balance_candidates_are_removed() {
        let candidates = vec![
            candidate(10_000.0, "avl bal inr 10,000", 8),
            candidate(200.0, " rs.200 spent at pos", 20),
        ];
        let filtered = filter_balance_candidates(candidates);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].value, 200.0);
    }

    #[test]
    fn test_available_limit_is_balance_context() {
        let c = candidate(50_000.0, "available limit: 50,000 on card", 0);
        assert!(is_balance_context(&c));
    }

    #[test]
    fn test_empty_list_selects_nothing() {
        assert!(select(&[]).is_none());
    }

    #[test]
    fn test_single_candidate_selected_as_is() {
        let c = candidate(500.0, "rs.500 debited", 0);
        let selected = select(std::slice::from_ref(&c)).unwrap();
        assert_eq!(selected, c);
    }

    #[test]
    fn test_transaction_cue_beats_position() {
        let candidates = vec![
            candidate(1234.0, "ref no 1234 dated today", 0),
            candidate(250.0, "rs.250 spent at store", 30),
        ];
        let selected = select(&candidates).unwrap();
        assert_eq!(selected.value, 250.0);
    }

    #[test]
    fn test_earliest_cued_candidate_wins() {
        let candidates = vec![
            candidate(250.0, "rs.250 spent at store", 10),
            candidate(50.0, "cashback of 50 on upi", 40),
        ];
        let selected = select(&candidates).unwrap();
        assert_eq!(selected.value, 250.0);
    }

    #[test]
    fn test_no_cues_falls_back_to_earliest() {
        let candidates = vec![
            candidate(11.0, "code 11 item", 5),
            candidate(22.0, "code 22 item", 15),
        ];
        let selected = select(&candidates).unwrap();
        assert_eq!(selected.value, 11.0);
    }

    #[test]
    fn test_multiple_unresolved_still_returns_earliest() {
        // Two candidates, neither cued, same shape: ambiguity never escapes
        // this level; the earliest is a best-effort winner.
        let candidates = vec![
            candidate(7.0, "ticket 7 of 9", 3),
            candidate(9.0, "ticket 7 of 9", 12),
        ];
        assert_eq!(select(&candidates).unwrap().value, 7.0);
    }

    #[test]
    fn test_end_to_end_balance_then_cue() {
        let filtered = filter_balance_candidates(extract("Avl bal INR 10,000. Rs.200 spent at POS"));
        assert_eq!(filtered.len(), 1);
        let selected = select(&filtered).unwrap();
        assert_eq!(selected.value, 200.0);
    }
}
