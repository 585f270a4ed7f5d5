use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::coverage::Coverage;
use super::policy::LookupPolicy;
use super::price_point::PricePoint;
use super::time_range::TimeRange;

/// Ordered price history of a single currency.
///
/// Points are sorted by timestamp with at most one point per second; an
/// insert at an existing timestamp overwrites the old point. Covered ranges
/// live alongside the points (see [`Coverage`]) so a sparse stretch inside a
/// fetched window is not mistaken for a gap that needs fetching.
///
/// Deserialization re-sorts and deduplicates, so a hand-edited price file
/// cannot break the ordering invariant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SeriesRepr")]
pub struct PriceSeries {
    points: Vec<PricePoint>,
    coverage: Coverage,
}

/// Raw serialized form; repaired into an ordered [`PriceSeries`] on load.
#[derive(Deserialize)]
struct SeriesRepr {
    #[serde(default)]
    points: Vec<PricePoint>,
    #[serde(default)]
    coverage: Coverage,
}

impl From<SeriesRepr> for PriceSeries {
    fn from(repr: SeriesRepr) -> Self {
        let mut series = PriceSeries::new();
        series.merge(repr.points);
        series.coverage = repr.coverage;
        series
    }
}

impl PriceSeries {
    /// Empty series with empty coverage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no points are stored.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All stored points, ascending by timestamp.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Earliest stored point.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Latest stored point.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Covered-range bookkeeping for this series.
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Insert a point, overwriting any existing point at the same timestamp.
    pub fn insert(&mut self, point: PricePoint) {
        match self.points.binary_search_by_key(&point.time, |p| p.time) {
            Ok(i) => self.points[i] = point,
            Err(i) => self.points.insert(i, point),
        }
    }

    /// Insert a batch of points, newest write winning per timestamp.
    ///
    /// Returns how many points were processed.
    pub fn merge(&mut self, points: impl IntoIterator<Item = PricePoint>) -> usize {
        let mut merged = 0;
        for point in points {
            self.insert(point);
            merged += 1;
        }
        merged
    }

    /// Record that `range` has been fully fetched.
    pub fn mark_covered(&mut self, range: TimeRange) {
        self.coverage.insert(range);
    }

    /// Maximal sub-ranges of `range` not yet covered, ascending.
    pub fn missing_subranges(&self, range: &TimeRange) -> Vec<TimeRange> {
        self.coverage.missing_within(range)
    }

    /// Price at `time` under the given lookup policy.
    ///
    /// `Exact` requires a stored point at precisely `time`; `CarryForward`
    /// falls back to the nearest earlier point. Before the first point there
    /// is nothing to carry, so both policies return `None` there.
    pub fn value_at(&self, time: DateTime<Utc>, policy: LookupPolicy) -> Option<Decimal> {
        let after = self.points.partition_point(|p| p.time <= time);
        if after == 0 {
            return None;
        }
        let candidate = &self.points[after - 1];
        match policy {
            LookupPolicy::Exact => (candidate.time == time).then_some(candidate.price),
            LookupPolicy::CarryForward => Some(candidate.price),
        }
    }

    /// Stored points inside `range`, ascending, endpoints included.
    pub fn points_in(&self, range: &TimeRange) -> impl Iterator<Item = &PricePoint> {
        let lo = self.points.partition_point(|p| p.time < range.start());
        let hi = self.points.partition_point(|p| p.time <= range.end());
        self.points[lo..hi].iter()
    }

    /// Drop every point and all coverage.
    pub fn clear(&mut self) {
        self.points.clear();
        self.coverage.clear();
    }

    /// Multiply every stored price by `factor`. Coverage is unaffected.
    pub(crate) fn rescale(&mut self, factor: Decimal) {
        for point in &mut self.points {
            point.price *= factor;
        }
    }
}
