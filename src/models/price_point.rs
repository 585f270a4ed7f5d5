use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::floor_to_second;

/// A single observed price for one currency.
///
/// Immutable once built; stores overwrite whole points rather than mutating
/// them. Timestamps are floored to whole seconds on entry and serialize as
/// unix seconds; prices are exact decimals, never floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation time, second resolution.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,

    /// Observed price in the configured quote currency.
    pub price: Decimal,
}

impl PricePoint {
    /// Build a point, flooring the timestamp to whole seconds.
    pub fn new(time: DateTime<Utc>, price: Decimal) -> Self {
        Self {
            time: floor_to_second(time),
            price,
        }
    }

    /// Unix timestamp of the observation, in seconds.
    pub fn unix_seconds(&self) -> i64 {
        self.time.timestamp()
    }
}
