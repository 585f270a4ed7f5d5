pub mod chart;
pub mod gateway;
pub mod persistence;
pub mod stats;
pub mod store;
pub mod tracker;

pub use chart::{downsample, export_points, export_series, to_points, ChartPoint};
pub use gateway::{FetchError, FetchErrorKind, PriceGateway};
pub use persistence::{FileBackend, Persistence};
pub use stats::{series_stats, SeriesStats};
pub use store::PriceStore;
pub use tracker::{CurrencyTracker, EnsureReport, FailedRange};
