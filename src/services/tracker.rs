//! Per-currency tracking: keeping one series gap-free over requested ranges.

use tracing::{debug, info, warn};

use crate::models::{PriceSeries, TimeRange};

use super::gateway::{FetchError, PriceGateway};

/// A coverage hole whose fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRange {
    /// The hole the gateway was asked to fill.
    pub range: TimeRange,
    /// Why the fetch failed.
    pub error: FetchError,
}

/// Outcome of one [`CurrencyTracker::ensure_range`] call.
///
/// Partial success is normal: every hole is fetched independently, so some
/// may be filled while others fail and stay uncovered for the next attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsureReport {
    /// Holes fetched and marked covered by this call.
    pub fetched: Vec<TimeRange>,
    /// Holes whose fetch failed; they remain uncovered.
    pub failed: Vec<FailedRange>,
    /// Points merged into the series by this call.
    pub points_merged: usize,
}

impl EnsureReport {
    /// True when no hole failed (including the no-hole case).
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// True when the range was already fully covered: the gateway was never
    /// called.
    pub fn was_noop(&self) -> bool {
        self.fetched.is_empty() && self.failed.is_empty()
    }
}

/// Owns the price series of a single currency.
///
/// The tracker is the sole writer to its series. Trackers share nothing, so
/// distinct currencies can be driven from distinct threads; one tracker must
/// not run `ensure_range` against itself concurrently.
#[derive(Debug, Clone)]
pub struct CurrencyTracker {
    ticker: String,
    series: PriceSeries,
}

impl CurrencyTracker {
    /// Fresh tracker with an empty series. `ticker` must be normalized.
    pub(crate) fn new(ticker: String) -> Self {
        Self {
            ticker,
            series: PriceSeries::new(),
        }
    }

    /// Rebuild a tracker around persisted series data.
    pub(crate) fn from_series(ticker: String, series: PriceSeries) -> Self {
        Self { ticker, series }
    }

    /// The currency this tracker owns.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Read access to the series.
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Write access, for store-level operations (clear, rescale).
    pub(crate) fn series_mut(&mut self) -> &mut PriceSeries {
        &mut self.series
    }

    /// Make sure `range` is fully covered, fetching any holes from `gateway`.
    ///
    /// Already-covered ranges return immediately without touching the
    /// gateway. Each hole is fetched on its own: a failure is recorded in
    /// the report and leaves that hole uncovered, but never aborts the
    /// remaining holes. A hole whose fetch succeeds is marked covered even
    /// when the provider returned no points there.
    pub fn ensure_range(&mut self, gateway: &dyn PriceGateway, range: &TimeRange) -> EnsureReport {
        let holes = self.series.missing_subranges(range);
        if holes.is_empty() {
            debug!(ticker = %self.ticker, %range, "range already covered, skipping fetch");
            return EnsureReport::default();
        }

        debug!(ticker = %self.ticker, %range, holes = holes.len(), "filling coverage holes");
        let mut report = EnsureReport::default();
        for hole in holes {
            match gateway.fetch(&self.ticker, &hole) {
                Ok(points) => {
                    report.points_merged += self.series.merge(points);
                    self.series.mark_covered(hole);
                    report.fetched.push(hole);
                }
                Err(error) => {
                    warn!(
                        ticker = %self.ticker,
                        range = %hole,
                        %error,
                        "fetch failed, hole stays uncovered"
                    );
                    report.failed.push(FailedRange { range: hole, error });
                }
            }
        }

        info!(
            ticker = %self.ticker,
            fetched = report.fetched.len(),
            failed = report.failed.len(),
            points_merged = report.points_merged,
            "ensure_range finished"
        );
        report
    }
}
