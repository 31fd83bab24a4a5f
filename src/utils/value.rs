//! Value Normalization
//!
//! Converts the raw QuickStats `Value` cell into `Option<f64>`. NASS mixes
//! plain numbers, comma-formatted strings, placeholder tokens and
//! suppression codes like `(D)` (withheld) or `(Z)` (below reporting
//! threshold) in a single column.
//!
//! `None` means "no observation" and is distinct from a true zero: summing
//! callers skip it, averaging callers exclude it from the denominator.
//! Nothing here ever returns an error; garbage normalizes to `None`.

use crate::record::RawValue;

/// Placeholder tokens NASS exports use for missing data.
const PLACEHOLDERS: &[&str] = &["", "-", "--", "NA", "N/A", "NULL", "NONE", "NAN"];

/// Normalize a raw cell to a numeric observation.
pub fn normalize(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Number(n) if n.is_finite() => Some(*n),
        RawValue::Number(_) => None,
        RawValue::Text(s) => parse_text(s),
        RawValue::Missing => None,
    }
}

fn parse_text(s: &str) -> Option<f64> {
    let trimmed = s.trim();

    if is_suppression_code(trimmed) {
        return None;
    }
    if PLACEHOLDERS
        .iter()
        .any(|p| trimmed.eq_ignore_ascii_case(p))
    {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Suppression marker: a short all-letter code in parentheses.
///
/// Covers the single-letter codes `(D) (Z) (S) (L) (H) (X)` and the
/// two-letter `(NA)`.
fn is_suppression_code(s: &str) -> bool {
    let Some(inner) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) else {
        return false;
    };
    let inner = inner.trim();
    !inner.is_empty() && inner.len() <= 2 && inner.chars().all(|c| c.is_ascii_alphabetic())
}
