//! Flattening seam between the store and a plotting layer.
//!
//! Renderers get plain `(time, value)` pairs and nothing else: no series,
//! coverage, or bundle structure leaks past this module. Both raw series
//! windows and bundle aggregates flatten the same way.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{PricePoint, PriceSeries, TimeRange};

/// One drawable point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Timestamp, second resolution.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,

    /// Value to draw, exact decimal.
    pub value: Decimal,
}

impl From<PricePoint> for ChartPoint {
    fn from(point: PricePoint) -> Self {
        Self {
            time: point.time,
            value: point.price,
        }
    }
}

/// Flatten an ordered price sequence into chart points.
pub fn to_points<'a>(points: impl IntoIterator<Item = &'a PricePoint>) -> Vec<ChartPoint> {
    points.into_iter().map(|p| ChartPoint::from(*p)).collect()
}

/// Thin a point list down to roughly `max_points`, keeping every k-th point.
///
/// Histories below the cap pass through untouched; at or above it, the
/// stride is chosen so the result lands near half the cap. Dense histories
/// draw no better at full resolution, and the first point is always kept so
/// the window's left edge stays anchored. A cap of zero disables thinning.
pub fn downsample(points: &[ChartPoint], max_points: usize) -> Vec<ChartPoint> {
    if max_points == 0 || points.len() < max_points {
        return points.to_vec();
    }
    let target = (max_points / 2).max(1);
    let stride = (points.len() / target).max(1);
    debug!(
        len = points.len(),
        max_points, stride, "downsampling chart points"
    );
    points.iter().copied().step_by(stride).collect()
}

/// Window, flatten, and thin one series in a single call.
pub fn export_series(series: &PriceSeries, range: &TimeRange, max_points: usize) -> Vec<ChartPoint> {
    let flat = to_points(series.points_in(range));
    downsample(&flat, max_points)
}

/// Flatten and thin an already-computed point list (bundle aggregates).
pub fn export_points(points: &[PricePoint], max_points: usize) -> Vec<ChartPoint> {
    let flat = to_points(points);
    downsample(&flat, max_points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn chart_points(n: usize) -> Vec<ChartPoint> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| ChartPoint {
                time: base + chrono::Duration::seconds(i as i64),
                value: Decimal::from(i as i64),
            })
            .collect()
    }

    #[test]
    fn test_to_points_preserves_order_and_values() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let prices = vec![
            PricePoint::new(base, Decimal::from(10)),
            PricePoint::new(base + chrono::Duration::seconds(5), Decimal::from(20)),
        ];
        let flat = to_points(&prices);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].time, prices[0].time);
        assert_eq!(flat[0].value, Decimal::from(10));
        assert_eq!(flat[1].value, Decimal::from(20));
    }

    #[test]
    fn test_downsample_passes_small_lists_through() {
        let points = chart_points(1999);
        assert_eq!(downsample(&points, 2000).len(), 1999);
    }

    #[test]
    fn test_downsample_thins_at_the_cap() {
        let points = chart_points(2000);
        let thinned = downsample(&points, 2000);
        // stride 2: every other point survives
        assert_eq!(thinned.len(), 1000);
        assert_eq!(thinned[0], points[0]);
        assert_eq!(thinned[1], points[2]);
    }

    #[test]
    fn test_downsample_stride_grows_with_input() {
        let points = chart_points(10_000);
        let thinned = downsample(&points, 2000);
        // stride 10
        assert_eq!(thinned.len(), 1000);
        assert_eq!(thinned[1], points[10]);
    }

    #[test]
    fn test_downsample_zero_cap_disables_thinning() {
        let points = chart_points(5000);
        assert_eq!(downsample(&points, 0).len(), 5000);
    }

    #[test]
    fn test_downsample_always_keeps_the_first_point() {
        for n in [2000, 3000, 12345] {
            let points = chart_points(n);
            let thinned = downsample(&points, 2000);
            assert_eq!(thinned[0], points[0]);
        }
    }
}
