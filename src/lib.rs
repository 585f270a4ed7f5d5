//! Price-series store and bundle aggregation engine for cryptocurrency
//! charting.
//!
//! Tracks one historical price series per currency, remembers exactly which
//! time ranges have already been fetched so a provider is never asked twice
//! for the same data, and aggregates weighted baskets of currencies
//! ("bundles") into derived series for plotting. Prices are exact decimals
//! end to end; timestamps live at whole-second resolution.
//!
//! The crate owns no I/O: prices arrive through a [`PriceGateway`]
//! implementation and state persists through a [`Persistence`] one (a
//! file-backed adapter ships as [`FileBackend`]).
//!
//! # Quick start
//!
//! ```
//! use coinplot::{PriceStore, StoreConfig};
//! use rust_decimal::Decimal;
//!
//! let mut store = PriceStore::new(StoreConfig::default());
//! store.register_currency("btc")?;
//! store.register_currency("eth")?;
//! store.create_bundle(
//!     "majors",
//!     vec![
//!         ("BTC".to_string(), Decimal::ONE),
//!         ("ETH".to_string(), Decimal::TWO),
//!     ],
//! )?;
//!
//! assert_eq!(store.tickers(), vec!["BTC", "ETH"]);
//! assert_eq!(store.bundle_names(), vec!["majors"]);
//! # Ok::<(), coinplot::StoreError>(())
//! ```
//!
//! Fetching and charting go through the same store: `ensure_range` fills
//! coverage holes via the gateway, `chart_series` / `chart_bundle` hand the
//! plotting layer flat, thinned point lists.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use models::{
    Bundle, Coverage, GapPolicy, LookupPolicy, MemberResolution, PricePoint, PriceSeries,
    StoreSnapshot, TimeRange,
};
pub use services::{
    ChartPoint, CurrencyTracker, EnsureReport, FailedRange, FetchError, FetchErrorKind,
    FileBackend, Persistence, PriceGateway, PriceStore, SeriesStats,
};
