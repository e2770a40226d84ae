//! Parsing helpers for text scraped out of rendered trading pages.
//!
//! Page cells arrive as display strings ("1,234.5678", "-$4.03",
//! "+$101.50 (3.13%)"); everything downstream wants `Decimal`.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a position-size cell such as "2.0000" or "-1,234.5678".
///
/// Strips thousands separators and normalizes the unicode minus some pages
/// render. Returns None for anything that is not a number.
pub fn parse_signed_size(text: &str) -> Option<Decimal> {
    let normalized: String = text
        .trim()
        .chars()
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .filter(|c| *c != ',')
        .collect();

    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Extract the leading currency amount from a cell such as "-$4.03" or
/// "+$101.50 (3.13%)". Falls back to plain-number parsing when no dollar
/// sign is present (some funding cells render bare numbers).
pub fn parse_currency(text: &str) -> Option<Decimal> {
    let normalized = text.trim().replace('\u{2212}', "-");

    let (negative, magnitude_src) = match normalized.find('$') {
        Some(idx) => (normalized[..idx].contains('-'), &normalized[idx + 1..]),
        None => (false, normalized.as_str()),
    };

    let magnitude: String = magnitude_src
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
        .filter(|c| *c != ',')
        .collect();

    if magnitude.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&magnitude).ok()?;
    Some(if negative { -value } else { value })
}
