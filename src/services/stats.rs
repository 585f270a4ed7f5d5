//! Summary statistics over stored price windows.

use rust_decimal::Decimal;

use crate::models::{PricePoint, PriceSeries, TimeRange};

/// Price statistics over one window of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesStats {
    /// Points in the window.
    pub count: usize,
    /// Lowest observed price.
    pub min: Decimal,
    /// Highest observed price.
    pub max: Decimal,
    /// Arithmetic mean of observed prices. Observations only; carried-forward
    /// values between points do not weigh in.
    pub mean: Decimal,
}

/// Statistics for `series` within `range`, or over the full history when
/// `range` is `None`. Returns `None` for a window with no points.
pub fn series_stats(series: &PriceSeries, range: Option<&TimeRange>) -> Option<SeriesStats> {
    match range {
        Some(range) => fold_stats(series.points_in(range)),
        None => fold_stats(series.points().iter()),
    }
}

fn fold_stats<'a>(points: impl Iterator<Item = &'a PricePoint>) -> Option<SeriesStats> {
    let mut count = 0usize;
    let mut sum = Decimal::ZERO;
    let mut min: Option<Decimal> = None;
    let mut max: Option<Decimal> = None;

    for point in points {
        count += 1;
        sum += point.price;
        min = Some(min.map_or(point.price, |m| m.min(point.price)));
        max = Some(max.map_or(point.price, |m| m.max(point.price)));
    }

    let (min, max) = (min?, max?);
    Some(SeriesStats {
        count,
        min,
        max,
        mean: sum / Decimal::from(count),
    })
}
