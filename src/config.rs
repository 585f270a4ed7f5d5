use tracing::debug;

use crate::constants::{
    DEFAULT_MAX_CHART_POINTS, DEFAULT_QUOTE_CURRENCY, ENV_MAX_CHART_POINTS, ENV_QUOTE_CURRENCY,
};

/// Store-wide settings.
///
/// The quote currency is a label attached to fetched prices; changing it does
/// not convert stored history (see [`crate::services::PriceStore::rescale_prices`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Currency all prices are denominated in, e.g. `USD`.
    pub quote_currency: String,

    /// Cap on points handed to the chart layer; larger windows are thinned.
    pub max_chart_points: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            quote_currency: DEFAULT_QUOTE_CURRENCY.to_string(),
            max_chart_points: DEFAULT_MAX_CHART_POINTS,
        }
    }
}

impl StoreConfig {
    /// Build a config from environment variables, falling back to defaults.
    ///
    /// `COINPLOT_QUOTE_CURRENCY` sets the quote currency (uppercased);
    /// `COINPLOT_MAX_CHART_POINTS` sets the chart cap (must parse to a
    /// positive integer, otherwise the default applies).
    pub fn from_env() -> Self {
        let quote_currency = std::env::var(ENV_QUOTE_CURRENCY)
            .ok()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_QUOTE_CURRENCY.to_string());

        let max_chart_points = std::env::var(ENV_MAX_CHART_POINTS)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_CHART_POINTS);

        debug!(
            quote_currency = %quote_currency,
            max_chart_points,
            "store configuration resolved"
        );
        StoreConfig {
            quote_currency,
            max_chart_points,
        }
    }

    /// Same config with a different quote currency label.
    pub fn with_quote_currency(mut self, quote_currency: impl Into<String>) -> Self {
        self.quote_currency = quote_currency.into().trim().to_ascii_uppercase();
        self
    }

    /// Same config with a different chart point cap.
    pub fn with_max_chart_points(mut self, max_chart_points: usize) -> Self {
        self.max_chart_points = max_chart_points;
        self
    }
}
