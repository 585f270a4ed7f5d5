//! Small helpers shared across models and services.

use chrono::{DateTime, Utc};

/// Normalize a user-supplied ticker: trimmed, ASCII-uppercased.
///
/// Tickers are case-insensitive everywhere in the store; this is the one
/// place the canonical form is decided.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_ascii_uppercase()
}

/// Floor a timestamp to whole-second resolution.
///
/// Prices and ranges live in the integer-second domain; sub-second input is
/// truncated on entry so two observations within the same second collide.
pub fn floor_to_second(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or(time)
}
