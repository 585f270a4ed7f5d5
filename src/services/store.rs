//! The top-level price store: every tracker and bundle lives here.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::models::{
    Bundle, GapPolicy, MemberResolution, PricePoint, PriceSeries, StoreSnapshot, TimeRange,
};
use crate::utils::normalize_ticker;

use super::chart::{self, ChartPoint};
use super::gateway::PriceGateway;
use super::stats::{self, SeriesStats};
use super::tracker::{CurrencyTracker, EnsureReport};

/// Owns all currency trackers and bundle definitions.
///
/// Every query and mutation goes through this type; there is no global
/// registry. Bundles reference currencies by ticker only, so removing a
/// currency can never dangle a pointer, just a name, which
/// [`PriceStore::bundle_health`] reports and [`GapPolicy`] decides how to
/// treat during aggregation.
///
/// Failed operations return an error and leave the store exactly as it was.
#[derive(Debug, Clone)]
pub struct PriceStore {
    trackers: BTreeMap<String, CurrencyTracker>,
    bundles: BTreeMap<String, Bundle>,
    config: StoreConfig,
}

impl PriceStore {
    /// Empty store with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            trackers: BTreeMap::new(),
            bundles: BTreeMap::new(),
            config,
        }
    }

    /// Empty store with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(StoreConfig::default())
    }

    /// The store's configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // -- currencies ------------------------------------------------------

    /// Start tracking a currency with an empty series.
    pub fn register_currency(&mut self, ticker: &str) -> Result<()> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Err(StoreError::InvalidTicker(ticker));
        }
        if self.trackers.contains_key(&ticker) {
            return Err(StoreError::DuplicateTicker(ticker));
        }
        info!(ticker = %ticker, "currency registered");
        self.trackers
            .insert(ticker.clone(), CurrencyTracker::new(ticker));
        Ok(())
    }

    /// Stop tracking a currency, dropping its entire history.
    ///
    /// Bundles that reference the ticker keep the dangling name; use
    /// [`PriceStore::bundles_referencing`] to find them before removal.
    pub fn remove_currency(&mut self, ticker: &str) -> Result<()> {
        let ticker = normalize_ticker(ticker);
        if self.trackers.remove(&ticker).is_none() {
            return Err(StoreError::UnknownTicker(ticker));
        }
        let referencing = self.bundles_referencing(&ticker);
        if !referencing.is_empty() {
            debug!(
                ticker = %ticker,
                bundles = referencing.len(),
                "removed currency is still referenced by bundles"
            );
        }
        info!(ticker = %ticker, "currency removed");
        Ok(())
    }

    /// Tracked tickers, ascending.
    pub fn tickers(&self) -> Vec<String> {
        self.trackers.keys().cloned().collect()
    }

    /// Is `ticker` currently tracked?
    pub fn is_tracked(&self, ticker: &str) -> bool {
        self.trackers.contains_key(&normalize_ticker(ticker))
    }

    /// Read access to a currency's series.
    pub fn series(&self, ticker: &str) -> Result<&PriceSeries> {
        let ticker = normalize_ticker(ticker);
        match self.trackers.get(&ticker) {
            Some(tracker) => Ok(tracker.series()),
            None => Err(StoreError::UnknownTicker(ticker)),
        }
    }

    /// Guarantee that `range` is covered for `ticker`, fetching holes
    /// through `gateway`. See [`CurrencyTracker::ensure_range`].
    pub fn ensure_range(
        &mut self,
        ticker: &str,
        range: &TimeRange,
        gateway: &dyn PriceGateway,
    ) -> Result<EnsureReport> {
        let ticker = normalize_ticker(ticker);
        match self.trackers.get_mut(&ticker) {
            Some(tracker) => Ok(tracker.ensure_range(gateway, range)),
            None => Err(StoreError::UnknownTicker(ticker)),
        }
    }

    /// Stored points for `ticker` within `range`, ascending.
    pub fn series_points(&self, ticker: &str, range: &TimeRange) -> Result<Vec<PricePoint>> {
        Ok(self.series(ticker)?.points_in(range).copied().collect())
    }

    /// Drop all points and coverage for `ticker`, keeping it tracked.
    pub fn clear_history(&mut self, ticker: &str) -> Result<()> {
        let ticker = normalize_ticker(ticker);
        match self.trackers.get_mut(&ticker) {
            Some(tracker) => {
                tracker.series_mut().clear();
                info!(ticker = %ticker, "history cleared");
                Ok(())
            }
            None => Err(StoreError::UnknownTicker(ticker)),
        }
    }

    // -- bundles ---------------------------------------------------------

    /// Create a bundle from its initial members.
    ///
    /// The name must be unused, every member ticker tracked, every weight
    /// positive, and the member list non-empty. Nothing changes on failure.
    pub fn create_bundle(
        &mut self,
        name: &str,
        members: impl IntoIterator<Item = (String, Decimal)>,
    ) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidBundleName(name.to_string()));
        }
        if self.bundles.contains_key(name) {
            return Err(StoreError::DuplicateBundle(name.to_string()));
        }
        let bundle = Bundle::new(name, members)?;
        for ticker in bundle.tickers() {
            if !self.trackers.contains_key(ticker) {
                return Err(StoreError::UnknownTicker(ticker.to_string()));
            }
        }
        info!(bundle = %name, members = bundle.len(), "bundle created");
        self.bundles.insert(name.to_string(), bundle);
        Ok(())
    }

    /// Delete a bundle. Member series are untouched.
    pub fn delete_bundle(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if self.bundles.remove(name).is_none() {
            return Err(StoreError::UnknownBundle(name.to_string()));
        }
        info!(bundle = %name, "bundle deleted");
        Ok(())
    }

    /// Bundle names, ascending.
    pub fn bundle_names(&self) -> Vec<String> {
        self.bundles.keys().cloned().collect()
    }

    /// Read access to a bundle definition.
    pub fn bundle(&self, name: &str) -> Result<&Bundle> {
        let name = name.trim();
        self.bundles
            .get(name)
            .ok_or_else(|| StoreError::UnknownBundle(name.to_string()))
    }

    /// Add a member to an existing bundle. The ticker must be tracked.
    pub fn add_bundle_member(&mut self, name: &str, ticker: &str, weight: Decimal) -> Result<()> {
        let name = name.trim();
        let ticker = normalize_ticker(ticker);
        if !self.trackers.contains_key(&ticker) {
            return Err(StoreError::UnknownTicker(ticker));
        }
        match self.bundles.get_mut(name) {
            Some(bundle) => {
                bundle.add_member(&ticker, weight)?;
                info!(bundle = %name, ticker = %ticker, %weight, "bundle member added");
                Ok(())
            }
            None => Err(StoreError::UnknownBundle(name.to_string())),
        }
    }

    /// Remove a member from a bundle. The last member cannot be removed.
    pub fn remove_bundle_member(&mut self, name: &str, ticker: &str) -> Result<()> {
        let name = name.trim();
        match self.bundles.get_mut(name) {
            Some(bundle) => {
                bundle.remove_member(ticker)?;
                info!(bundle = %name, ticker = %normalize_ticker(ticker), "bundle member removed");
                Ok(())
            }
            None => Err(StoreError::UnknownBundle(name.to_string())),
        }
    }

    /// Which members of `name` resolve to live trackers, and which dangle.
    pub fn bundle_health(&self, name: &str) -> Result<MemberResolution> {
        let bundle = self.bundle(name)?;
        let tracked: BTreeSet<String> = self.trackers.keys().cloned().collect();
        Ok(bundle.resolve_members(&tracked))
    }

    /// Names of bundles referencing `ticker`, ascending.
    pub fn bundles_referencing(&self, ticker: &str) -> Vec<String> {
        let ticker = normalize_ticker(ticker);
        self.bundles
            .values()
            .filter(|bundle| bundle.contains(&ticker))
            .map(|bundle| bundle.name().to_string())
            .collect()
    }

    /// Weighted aggregate of a bundle over `range`. See
    /// [`Bundle::aggregate_series`] for the point-by-point semantics.
    pub fn bundle_aggregate(
        &self,
        name: &str,
        range: &TimeRange,
        policy: GapPolicy,
    ) -> Result<Vec<PricePoint>> {
        let bundle = self.bundle(name)?;
        let mut series_by_ticker: BTreeMap<String, &PriceSeries> = BTreeMap::new();
        for ticker in bundle.tickers() {
            if let Some(tracker) = self.trackers.get(ticker) {
                series_by_ticker.insert(ticker.to_string(), tracker.series());
            }
        }
        debug!(
            bundle = %bundle.name(),
            members = bundle.len(),
            resolved = series_by_ticker.len(),
            %policy,
            "aggregating bundle"
        );
        bundle.aggregate_series(&series_by_ticker, range, policy)
    }

    // -- statistics and maintenance --------------------------------------

    /// Min/max/mean statistics for a ticker, over `range` or all history.
    pub fn series_stats(
        &self,
        ticker: &str,
        range: Option<&TimeRange>,
    ) -> Result<Option<SeriesStats>> {
        Ok(stats::series_stats(self.series(ticker)?, range))
    }

    /// Multiply every stored price of every currency by `factor`.
    ///
    /// Pairs with changing [`StoreConfig::quote_currency`]: switching the
    /// denomination of the store means relabelling the config and rescaling
    /// history with the conversion rate. The factor must be positive.
    pub fn rescale_prices(&mut self, factor: Decimal) -> Result<()> {
        if factor <= Decimal::ZERO {
            return Err(StoreError::InvalidFactor(factor));
        }
        for tracker in self.trackers.values_mut() {
            tracker.series_mut().rescale(factor);
        }
        info!(%factor, currencies = self.trackers.len(), "prices rescaled");
        Ok(())
    }

    // -- chart export ----------------------------------------------------

    /// A ticker's window as chart points, thinned to the configured cap.
    pub fn chart_series(&self, ticker: &str, range: &TimeRange) -> Result<Vec<ChartPoint>> {
        let series = self.series(ticker)?;
        Ok(chart::export_series(
            series,
            range,
            self.config.max_chart_points,
        ))
    }

    /// A bundle aggregate as chart points, thinned to the configured cap.
    pub fn chart_bundle(
        &self,
        name: &str,
        range: &TimeRange,
        policy: GapPolicy,
    ) -> Result<Vec<ChartPoint>> {
        let aggregate = self.bundle_aggregate(name, range, policy)?;
        Ok(chart::export_points(&aggregate, self.config.max_chart_points))
    }

    // -- snapshots -------------------------------------------------------

    /// The complete persistent state: all series and all bundles.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            series: self
                .trackers
                .iter()
                .map(|(ticker, tracker)| (ticker.clone(), tracker.series().clone()))
                .collect(),
            bundles: self.bundles.clone(),
        }
    }

    /// Rebuild a store from persisted state.
    ///
    /// Tickers are re-normalized on the way in, so a hand-edited snapshot
    /// with lowercase tickers still resolves.
    pub fn from_snapshot(snapshot: StoreSnapshot, config: StoreConfig) -> Self {
        let trackers: BTreeMap<String, CurrencyTracker> = snapshot
            .series
            .into_iter()
            .map(|(ticker, series)| {
                let ticker = normalize_ticker(&ticker);
                (ticker.clone(), CurrencyTracker::from_series(ticker, series))
            })
            .collect();
        info!(
            currencies = trackers.len(),
            bundles = snapshot.bundles.len(),
            "store restored from snapshot"
        );
        Self {
            trackers,
            bundles: snapshot.bundles,
            config,
        }
    }
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
