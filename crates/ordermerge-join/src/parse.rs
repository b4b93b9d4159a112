//! Lenient numeric parsing for export cells.

pub const DEFAULT_QUANTITY: u32 = 1;
pub const DEFAULT_NET_AMOUNT: f64 = 0.0;

/// Parses a money cell such as `"1,250.00"`, ignoring thousands separators.
///
/// Returns `None` for empty, malformed or non-finite input.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Item quantity, or [`DEFAULT_QUANTITY`] when the cell is empty or not a
/// non-negative integer.
#[must_use]
pub fn quantity_or_default(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(DEFAULT_QUANTITY)
}

/// Item net amount, or [`DEFAULT_NET_AMOUNT`] when the cell is empty or
/// malformed.
///
/// Thousands separators are accepted here as in the header totals, so
/// `"1,049.99"` is 1049.99 rather than a malformed cell.
#[must_use]
pub fn net_amount_or_default(raw: &str) -> f64 {
    parse_amount(raw).unwrap_or(DEFAULT_NET_AMOUNT)
}
