//! Currency conversion against caller-supplied rate tables
//!
//! Rates map lowercase currency codes to per-unit values against a common
//! base. Two tables are consulted: the user's custom overrides first, then
//! the cached exchange table. Conversion is best-effort: a missing rate
//! leaves the amount unconverted.

use std::collections::HashMap;

use tracing::debug;

/// Resolve the rate for a code, custom overrides before the cached table
pub fn resolve_rate(
    code: &str,
    custom: &HashMap<String, f64>,
    cached: &HashMap<String, f64>,
) -> Option<f64> {
    let code = code.to_lowercase();
    custom
        .get(&code)
        .copied()
        .or_else(|| cached.get(&code).copied())
}

/// Convert `amount` between currencies
///
/// Returns `None` when either rate is unresolvable (or degenerate); the
/// caller then keeps the original amount.
pub fn convert(
    amount: f64,
    from: &str,
    to: &str,
    custom: &HashMap<String, f64>,
    cached: &HashMap<String, f64>,
) -> Option<f64> {
    if from.eq_ignore_ascii_case(to) {
        return Some(amount);
    }

    let from_rate = resolve_rate(from, custom, cached)?;
    let to_rate = resolve_rate(to, custom, cached)?;
    if from_rate == 0.0 {
        return None;
    }

    let converted = amount / from_rate * to_rate;
    debug!(
        "Converted {} {} -> {} {} (rates {} / {})",
        amount, from, converted, to, from_rate, to_rate
    );
    Some(converted)
}
