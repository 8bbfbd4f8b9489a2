//! Lenient numeric parsing of table cells
//!
//! Numeric cells never abort a build. A cell that cannot be read as the
//! expected quantity becomes zero and a warning is logged.

use std::str::FromStr;

use crate::{Money, Table};

/// Reads a non-negative integral count like `5`, `5.0` or ` 5 `
pub(crate) fn count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }

    let n = raw.parse::<f64>().ok()?;
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < u64::MAX as f64).then(|| n as u64)
}

/// Reads a non-negative decimal amount like `19.99` or `1.5e1`
pub(crate) fn money(raw: &str) -> Option<Money> {
    let raw = raw.trim();
    let amount = Money::from_str(raw)
        .or_else(|_| Money::from_scientific(raw))
        .ok()?;

    (amount.is_zero() || amount.is_sign_positive()).then(|| amount.normalize())
}

/// Coerces `raw` with `parse`, falling back to `default` for unreadable cells
///
/// Empty cells fall back silently, everything else is logged.
pub(crate) fn or_default<T>(
    table: Table,
    line: u64,
    column: &str,
    raw: &str,
    parse: impl FnOnce(&str) -> Option<T>,
    default: T,
) -> T {
    if raw.trim().is_empty() {
        return default;
    }

    match parse(raw) {
        Some(value) => value,
        None => {
            log::warn!("{table} - line {line}: unreadable {column} '{raw}', using 0");
            default
        }
    }
}
