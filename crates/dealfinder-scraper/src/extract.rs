//! Field extraction from listing text.
//!
//! Everything here is pure: absence of a field is a normal `None`, never an
//! error, so adapters can skip incomplete fragments without special handling.

use std::sync::LazyLock;

use dealfinder_core::STOCK_UNKNOWN;
use regex::Regex;

/// Optional currency symbol, digits with optional `,` thousands groups, and a
/// mandatory two-digit fraction that is not followed by another digit.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[$€£]\s?)?((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})(?:\D|$)")
        .expect("valid price regex")
});

/// Leading `[Retailer]` tag as used in deal-forum thread titles.
static RETAILER_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([^\[\]]+)\]").expect("valid retailer tag regex"));

/// Returns the value of the first decimal price in `text`.
///
/// `"Widget Pro - $49.99 today"` yields `49.99`; `"$1,049.99"` yields
/// `1049.99`. Whole numbers without a two-digit fraction (`"50 left"`) are
/// not prices.
#[must_use]
pub fn extract_price(text: &str) -> Option<f64> {
    let caps = PRICE_RE.captures(text)?;
    let digits: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(|c| *c != ',')
        .collect();
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Returns the retailer named in a leading `[Retailer]` tag, if any.
#[must_use]
pub fn extract_retailer_tag(title: &str) -> Option<String> {
    RETAILER_TAG_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|s| !s.is_empty())
}

/// Collapses whitespace runs (including newlines from nested markup) and trims.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes availability text, falling back to `"unknown"`.
#[must_use]
pub fn normalize_stock(raw: Option<&str>) -> String {
    raw.map(clean_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| STOCK_UNKNOWN.to_string())
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
