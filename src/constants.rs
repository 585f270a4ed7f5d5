//! Store-wide defaults and on-disk layout constants.

/// Default quote currency prices are denominated in.
pub const DEFAULT_QUOTE_CURRENCY: &str = "USD";

/// Default cap on the number of points handed to the chart layer.
///
/// Histories at or above this size are thinned before plotting; below it
/// every stored point is drawn. See [`crate::services::chart::downsample`].
pub const DEFAULT_MAX_CHART_POINTS: usize = 2000;

/// Environment variable overriding the quote currency.
pub const ENV_QUOTE_CURRENCY: &str = "COINPLOT_QUOTE_CURRENCY";

/// Environment variable overriding the chart point cap.
pub const ENV_MAX_CHART_POINTS: &str = "COINPLOT_MAX_CHART_POINTS";

/// File names inside a [`crate::services::FileBackend`] data directory.
pub mod store_file {
    /// Sorted list of tracked tickers (JSON array).
    pub const TICKERS: &str = "tickers.json";

    /// Bundle definitions keyed by name (JSON object).
    pub const BUNDLES: &str = "bundles.json";

    /// Covered ranges per ticker, as unix-second pairs (JSON object).
    pub const COVERAGE: &str = "coverage.json";

    /// Directory holding one price CSV per ticker.
    pub const PRICES_DIR: &str = "prices";

    /// Suffix for not-yet-renamed writes; leftovers are ignored on load.
    pub const TMP_SUFFIX: &str = ".tmp";
}

/// Header row of the per-ticker price CSV files.
pub const PRICES_CSV_HEADER: [&str; 2] = ["time", "price"];
